use tracing::Level;

/// Install the global fmt subscriber; DEBUG when `verbose`, INFO otherwise.
///
/// Safe to call more than once, later calls are ignored.
pub fn init_logger(verbose: bool) {
    let max_level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}
