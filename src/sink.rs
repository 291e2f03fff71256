use std::path::PathBuf;

use crate::error::AppError;
use crate::source::Item;

/// Item attribute holding the predicted identity label
pub const ATTR_LABEL: &str = "face.label";

/// Item attribute holding the path of the saved frame, if any
pub const ATTR_SAVED_FRAME: &str = "face.saved_frame";

/// Item attribute holding the error message of a failed item
pub const ATTR_ERROR: &str = "face.error";

/// Result of recognising one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    /// Predicted identity label
    pub label: i32,
    /// Where the frame was written when image saving is enabled
    pub saved_frame: Option<PathBuf>,
}

/// Routing decision for a processed item
#[derive(Debug)]
pub enum Outcome {
    /// Item recognised; attributes already carry the label
    Success { item: Item, recognition: Recognition },

    /// Item could not be decoded, predicted or saved
    Failure { item: Item, error: AppError },
}

impl Outcome {
    pub fn item(&self) -> &Item {
        match self {
            Outcome::Success { item, .. } | Outcome::Failure { item, .. } => item,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn label(&self) -> Option<i32> {
        match self {
            Outcome::Success { recognition, .. } => Some(recognition.label),
            Outcome::Failure { .. } => None,
        }
    }
}

/// Push-based completion signal back to the host.
pub trait CompletionSink {
    fn complete(&mut self, outcome: Outcome);
}

/// Collects every outcome in arrival order
#[derive(Debug, Default)]
pub struct VecSink {
    pub outcomes: Vec<Outcome>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

impl CompletionSink for VecSink {
    fn complete(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }
}

/// Logs each outcome and drops it
#[derive(Debug, Default)]
pub struct LogSink;

impl CompletionSink for LogSink {
    fn complete(&mut self, outcome: Outcome) {
        match &outcome {
            Outcome::Success { item, recognition } => tracing::info!(
                "[success] {} -> label {}",
                item.display_name(),
                recognition.label
            ),
            Outcome::Failure { item, error } => {
                tracing::warn!("[failure] {}: {}", item.display_name(), error)
            }
        }
    }
}

