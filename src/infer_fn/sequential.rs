use std::time::Instant;

use crate::error::Result;
use crate::predict::FaceRecognitionProcessor;
use crate::progress_bar::recognition_progress_bar;
use crate::sink::CompletionSink;
use crate::source::ItemSource;

use super::RunStats;

/// Naive sequential recognition: process items one by one
pub fn sequential_infer<S, K>(
    processor: &FaceRecognitionProcessor,
    source: &mut S,
    sink: &mut K,
) -> Result<RunStats>
where
    S: ItemSource,
    K: CompletionSink,
{
    let start_time = Instant::now();
    tracing::info!("Running sequential recognition...");

    // train up front so a bad training set aborts before any item is taken
    processor.recognizer()?;

    let total_items = source.len_hint();
    if let Some(total) = total_items {
        tracing::info!("Total items to process: {}", total);
    }
    tracing::info!("-----------------------------------------");

    let pb = recognition_progress_bar(total_items);
    let mut stats = RunStats::default();

    while let Some(item) = source.next_item() {
        let outcome = processor.process(item)?;
        stats.record(&outcome);
        sink.complete(outcome);
        pb.inc(1);
    }
    pb.finish_using_style();

    tracing::info!(
        "Processed {} items ({} recognised, {} failed) in {:.3?}",
        stats.processed,
        stats.succeeded,
        stats.failed,
        start_time.elapsed()
    );
    Ok(stats)
}
