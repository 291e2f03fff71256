// -- submodules
mod channel_ppl;
mod sequential;

pub use channel_ppl::channel_pipeline_infer;
pub use sequential::sequential_infer;

// -- external imports
use serde::Deserialize;
use std::str::FromStr;
use strum::{Display, EnumString, VariantNames};

use crate::error::Result;
use crate::predict::FaceRecognitionProcessor;
use crate::sink::{CompletionSink, Outcome};
use crate::source::ItemSource;

// -- enums

/// How items are driven through the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, VariantNames)]
pub enum RunMode {
    #[default]
    #[strum(serialize = "Sequential")]
    Sequential,

    #[strum(serialize = "ChannelPipeline")]
    ChannelPipeline,
}

/// Custom deserializer with helpful error message
pub fn deserialize_run_mode<'de, D>(deserializer: D) -> Result<RunMode, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    RunMode::from_str(&value).map_err(|_| {
        let variants = RunMode::VARIANTS;
        serde::de::Error::invalid_value(
            serde::de::Unexpected::Str(&value),
            &format!("one of {}", variants.join(", ")).as_str(),
        )
    })
}

// -- structs

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunStats {
    fn record(&mut self, outcome: &Outcome) {
        self.processed += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

// -- public API

/// Pull every item from `source`, recognise it and push the outcome to `sink`.
///
/// The model is trained before the first item is pulled; a training error
/// aborts the run without consuming the source.
pub fn auto_infer<S, K>(
    processor: &FaceRecognitionProcessor,
    source: &mut S,
    sink: &mut K,
    run_mode: &RunMode,
) -> Result<RunStats>
where
    S: ItemSource + Send,
    K: CompletionSink,
{
    match run_mode {
        RunMode::Sequential => sequential_infer(processor, source, sink),
        RunMode::ChannelPipeline => channel_pipeline_infer(processor, source, sink),
    }
}
