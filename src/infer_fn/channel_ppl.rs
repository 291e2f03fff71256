use std::sync::{Mutex, mpsc};
use std::thread;
use std::time::Instant;

use crate::error::{AppError, Result};
use crate::predict::FaceRecognitionProcessor;
use crate::progress_bar::recognition_progress_bar;
use crate::sink::{CompletionSink, Outcome};
use crate::source::{Item, ItemSource};

use super::RunStats;

/// Channel-based concurrent pipeline recognition.
///
/// One loader thread pulls items from the host, `workers` threads share the
/// trained model, and outcomes are pushed to `sink` on the calling thread in
/// completion order.
pub fn channel_pipeline_infer<S, K>(
    processor: &FaceRecognitionProcessor,
    source: &mut S,
    sink: &mut K,
) -> Result<RunStats>
where
    S: ItemSource + Send,
    K: CompletionSink,
{
    let start_time = Instant::now();
    let args = processor.args();
    let channel_capacity = args.channel_capacity.unwrap_or(8).max(1);
    let workers = args.workers.max(1);
    let verbose = args.verbose;

    tracing::info!("Running channel-based pipeline recognition...");
    tracing::info!("Workers: {}, channel capacity: {}", workers, channel_capacity);

    // train before spawning so workers only ever see the shared model
    processor.recognizer()?;

    let total_items = source.len_hint();
    if let Some(total) = total_items {
        tracing::info!("Total items to process: {}", total);
    }
    tracing::info!("-----------------------------------------");

    // Create channels for pipeline stages with bounded capacity
    let (load_tx, load_rx) = mpsc::sync_channel::<Item>(channel_capacity);
    let (outcome_tx, outcome_rx) = mpsc::sync_channel::<Result<Outcome>>(channel_capacity);
    let load_rx = Mutex::new(load_rx);

    let pb = recognition_progress_bar(total_items);
    let mut stats = RunStats::default();
    let mut fatal: Option<AppError> = None;

    // Use scoped threads to allow borrowing the processor and source
    thread::scope(|s| {
        // Stage 1: Item loading thread
        let load_handler = s.spawn(move || {
            while let Some(item) = source.next_item() {
                if verbose {
                    tracing::debug!("[Loading]: {}", item.display_name());
                }
                if load_tx.send(item).is_err() {
                    break;
                }
            }
        });

        // Stage 2: Recognition threads
        let mut infer_handlers = Vec::with_capacity(workers);
        for worker_idx in 0..workers {
            let load_rx = &load_rx;
            let outcome_tx = outcome_tx.clone();
            infer_handlers.push(s.spawn(move || {
                loop {
                    let next = match load_rx.lock() {
                        Ok(rx) => rx.recv(),
                        Err(_) => break,
                    };
                    let Ok(item) = next else {
                        break;
                    };
                    if verbose {
                        tracing::debug!("[Recognising #{}]: {}", worker_idx, item.display_name());
                    }
                    if outcome_tx.send(processor.process(item)).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(outcome_tx);

        // Stage 3: Completion on the calling thread
        for result in outcome_rx {
            match result {
                Ok(outcome) => {
                    stats.record(&outcome);
                    sink.complete(outcome);
                    pb.inc(1);
                }
                Err(e) => {
                    tracing::error!("Fatal error in recognition worker: {}", e);
                    fatal.get_or_insert(e);
                }
            }
        }

        load_handler.join().expect("Loading thread panicked");
        for handler in infer_handlers {
            handler.join().expect("Recognition thread panicked");
        }
    });
    pb.finish_using_style();

    if let Some(e) = fatal {
        return Err(e);
    }

    tracing::info!(
        "Processed {} items ({} recognised, {} failed) in {:.3?}",
        stats.processed,
        stats.succeeded,
        stats.failed,
        start_time.elapsed()
    );
    Ok(stats)
}
