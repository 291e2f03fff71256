// -- submodules
#[cfg(feature = "opencv")]
mod opencv_backend;

#[cfg(feature = "opencv")]
pub use opencv_backend::{LbphParams, OpenCvBackend, OpenCvRecognizer};

// -- external imports
use image::GrayImage;
use std::fmt::Debug;

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::source::TrainingSet;

/// A fitted face classifier.
///
/// Implementations are immutable once trained and must tolerate concurrent
/// `predict` calls.
pub trait Recognizer: Send + Sync + Debug {
    /// Algorithm the model was fitted with
    fn algorithm(&self) -> Algorithm;

    /// Predict the identity label of a grayscale face image.
    fn predict(&self, image: &GrayImage) -> Result<i32>;
}

/// Entry point into the vision library: fits one classifier per call.
pub trait VisionBackend: Send + Sync {
    /// Fit a fresh model of kind `algorithm` on every sample of `training_set`.
    fn train(&self, algorithm: Algorithm, training_set: &TrainingSet)
    -> Result<Box<dyn Recognizer>>;
}
