mod algorithm;
mod convert;
mod error;
mod infer_fn;
mod logging;
mod predict;
mod progress_bar;
mod recognizer;
mod sink;
mod source;
mod toml_utils;

pub use algorithm::Algorithm;
pub use convert::{decode_gray, decode_image, gray_to_png_bytes, open_gray, to_png_bytes};
pub use error::{AppError, Result};
pub use infer_fn::{RunMode, RunStats, auto_infer};
pub use logging::init_logger;
pub use progress_bar::progress_bar_style;
pub use sink::{
    ATTR_ERROR, ATTR_LABEL, ATTR_SAVED_FRAME, CompletionSink, LogSink, Outcome, Recognition,
    VecSink,
};
pub use source::{
    ATTR_FILENAME, Item, ItemSource, Source, SourceLoader, TrainingSample, TrainingSet,
    VecItemSource, collect_files_from_dir, is_image_file, is_training_image, parse_label,
};
pub use toml_utils::parse_toml;

// Vision library boundary
pub use recognizer::{Recognizer, VisionBackend};

#[cfg(feature = "opencv")]
pub use convert::mat::{gray_to_mat, mat_to_gray};
#[cfg(feature = "opencv")]
pub use recognizer::{LbphParams, OpenCvBackend, OpenCvRecognizer};

// Core processing stage
pub use predict::{FaceRecognitionProcessor, RecognizeArgs, SAVED_FRAME_SUFFIX};
