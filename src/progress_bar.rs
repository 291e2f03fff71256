use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};

/// Get a standardized progress bar style
pub fn progress_bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg}: {wide_bar:.cyan/blue} {pos}/{len} [{elapsed_precise}]")
        .unwrap()
}

/// Progress bar for a run over `len` items, or an open-ended one when unknown
pub fn recognition_progress_bar(len: Option<usize>) -> ProgressBar {
    let pb = match len {
        Some(len) => ProgressBar::new(len as u64),
        None => ProgressBar::no_length(),
    };
    pb.with_style(progress_bar_style())
        .with_message("Recognising faces")
        .with_finish(ProgressFinish::WithMessage("Finished".into()))
}
