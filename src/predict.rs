use image::DynamicImage;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::algorithm::{Algorithm, deserialize_algorithm};
use crate::convert::{decode_image, to_png_bytes};
use crate::error::{AppError, Result};
use crate::infer_fn::{RunMode, RunStats, auto_infer, deserialize_run_mode};
use crate::recognizer::{Recognizer, VisionBackend};
use crate::sink::{
    ATTR_ERROR, ATTR_LABEL, ATTR_SAVED_FRAME, CompletionSink, Outcome, Recognition,
};
use crate::source::{Item, ItemSource, TrainingSet};

/// File name suffix of saved frames: `<unix-millis>-reognised.png`
pub const SAVED_FRAME_SUFFIX: &str = "-reognised.png";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecognizeArgs {
    /// Folder with training images named `<label>-<anything>.<jpg|pgm|png>`
    pub training_set: PathBuf,

    /// Face recognition algorithm
    #[serde(default, deserialize_with = "deserialize_algorithm")]
    pub algorithm: Algorithm,

    /// Whether recognised frames are written to `save_dir`
    pub save_images: bool,

    /// Directory for saved frames; the working directory when unset
    pub save_dir: Option<PathBuf>,

    /// How items are driven through the processor
    #[serde(default, deserialize_with = "deserialize_run_mode")]
    pub run_mode: RunMode,

    /// Recognition threads for the channel pipeline
    pub workers: usize,

    /// Multi-thread channel capacity
    pub channel_capacity: Option<usize>,

    /// Show verbose output
    pub verbose: bool,
}

impl Default for RecognizeArgs {
    fn default() -> Self {
        Self {
            training_set: PathBuf::new(),
            algorithm: Algorithm::default(),
            save_images: true,
            save_dir: None,
            run_mode: RunMode::default(),
            workers: 2,
            channel_capacity: Some(8),
            verbose: false,
        }
    }
}

impl RecognizeArgs {
    /// Check the required options.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the training-set path is empty or the
    /// worker count is zero.
    pub fn validate(&self) -> Result<()> {
        if self.training_set.as_os_str().is_empty() {
            return Err(AppError::Config(
                "training_set must be a non-empty path".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(AppError::Config("workers must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Directory saved frames land in. An empty path, so frames are written
    /// relative to the process working directory unless `save_dir` is set.
    pub fn frame_dir(&self) -> &Path {
        self.save_dir.as_deref().unwrap_or(Path::new(""))
    }
}

/// Recognises faces in incoming frames with a lazily trained, shared model.
///
/// The model is fitted once, by whichever caller first needs it; concurrent
/// first callers block on the same lock and reuse the single result.
pub struct FaceRecognitionProcessor {
    args: RecognizeArgs,
    backend: Arc<dyn VisionBackend>,
    recognizer: Mutex<Option<Arc<dyn Recognizer>>>,
    last_frame_millis: AtomicU64,
}

impl FaceRecognitionProcessor {
    /// # Errors
    ///
    /// Returns `AppError::Config` if `args` fails validation.
    pub fn new(args: RecognizeArgs, backend: Arc<dyn VisionBackend>) -> Result<Self> {
        args.validate()?;
        tracing::info!(
            "Face recognition configured: {} ({})",
            args.algorithm,
            args.algorithm.description()
        );
        Ok(Self {
            args,
            backend,
            recognizer: Mutex::new(None),
            last_frame_millis: AtomicU64::new(0),
        })
    }

    pub fn args(&self) -> &RecognizeArgs {
        &self.args
    }

    /// Whether a model has been fitted. Blocks while a training pass runs.
    pub fn is_trained(&self) -> bool {
        self.recognizer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Shared model, training it first if nobody has yet.
    ///
    /// # Errors
    ///
    /// Training errors are returned as-is and leave the processor untrained.
    /// A training pass that panicked leaves the slot empty, so the next
    /// caller retries.
    pub fn recognizer(&self) -> Result<Arc<dyn Recognizer>> {
        let mut guard = self
            .recognizer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(recognizer) = guard.as_ref() {
            return Ok(Arc::clone(recognizer));
        }

        let recognizer: Arc<dyn Recognizer> = Arc::from(self.train()?);
        *guard = Some(Arc::clone(&recognizer));
        Ok(recognizer)
    }

    fn train(&self) -> Result<Box<dyn Recognizer>> {
        let start_time = Instant::now();
        tracing::info!(
            "Training {} recognizer from {:?}",
            self.args.algorithm,
            self.args.training_set
        );

        let training_set = TrainingSet::load(&self.args.training_set)?;
        let recognizer = self.backend.train(self.args.algorithm, &training_set)?;

        tracing::info!(
            "Training complete: {} samples, {} identities in {:.3?}",
            training_set.len(),
            training_set.num_classes(),
            start_time.elapsed()
        );
        Ok(recognizer)
    }

    /// Decode one encoded frame, predict its label and optionally save it.
    pub fn recognize(&self, content: &[u8]) -> Result<Recognition> {
        let recognizer = self.recognizer()?;
        self.recognize_with(recognizer.as_ref(), content)
    }

    fn recognize_with(&self, recognizer: &dyn Recognizer, content: &[u8]) -> Result<Recognition> {
        let frame = decode_image(content)?;
        let face = frame.to_luma8();
        let label = recognizer.predict(&face)?;
        tracing::info!("Predicted label: {}", label);

        let saved_frame = if self.args.save_images {
            Some(self.save_frame(&frame)?)
        } else {
            None
        };

        Ok(Recognition { label, saved_frame })
    }

    /// Process one host item into a routed outcome.
    ///
    /// # Errors
    ///
    /// Only training errors are returned, since they abort the stage; decode,
    /// predict and save failures become `Outcome::Failure`.
    pub fn process(&self, mut item: Item) -> Result<Outcome> {
        let recognizer = self.recognizer()?;

        if self.args.verbose {
            tracing::debug!("Processing: {}", item.display_name());
        }

        match self.recognize_with(recognizer.as_ref(), &item.content) {
            Ok(recognition) => {
                item.attributes
                    .insert(ATTR_LABEL.to_string(), recognition.label.to_string());
                if let Some(path) = &recognition.saved_frame {
                    item.attributes
                        .insert(ATTR_SAVED_FRAME.to_string(), path.display().to_string());
                }
                Ok(Outcome::Success { item, recognition })
            }
            Err(error) => {
                tracing::error!(
                    "Recognition failed for {}, routing to failure. Error: {}",
                    item.display_name(),
                    error
                );
                item.attributes
                    .insert(ATTR_ERROR.to_string(), error.to_string());
                Ok(Outcome::Failure { item, error })
            }
        }
    }

    /// Drive every item of `source` through the processor into `sink`.
    pub fn run<S, K>(&self, source: &mut S, sink: &mut K) -> Result<RunStats>
    where
        S: ItemSource + Send,
        K: CompletionSink,
    {
        auto_infer(self, source, sink, &self.args.run_mode)
    }

    fn save_frame(&self, frame: &DynamicImage) -> Result<PathBuf> {
        let millis = self.next_frame_millis();
        let save_path = frame_path(self.args.frame_dir(), millis);
        let bytes = to_png_bytes(frame)?;
        std::fs::write(&save_path, bytes)?;
        if self.args.verbose {
            tracing::debug!("Saved frame to {:?}", save_path);
        }
        Ok(save_path)
    }

    /// Current unix time in milliseconds, bumped past the previous frame's so
    /// two frames never share a file name.
    fn next_frame_millis(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let previous = self
            .last_frame_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_default();
        now.max(previous + 1)
    }
}

fn frame_path(save_dir: &Path, millis: u64) -> PathBuf {
    save_dir.join(format!("{}{}", millis, SAVED_FRAME_SUFFIX))
}
