//! Recognise the faces in a frame file or directory of frames.
//!
//! Usage: `face-recognition [config.toml] [frames]`
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use face_recognition::{
    FaceRecognitionProcessor, LogSink, OpenCvBackend, Source, SourceLoader, init_logger,
    parse_toml,
};

fn main() -> Result<()> {
    let project_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let mut cli_args = std::env::args().skip(1);

    let config_toml = cli_args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| project_root.join("assets/configs/default.toml"));
    let frames = cli_args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| project_root.join("assets/frames"));

    let args = parse_toml(&config_toml, &project_root)
        .with_context(|| format!("Failed to parse TOML config: {:?}", config_toml))?;
    init_logger(args.verbose);
    tracing::info!("Config loaded: {:?}", args);

    if let Some(save_dir) = args.save_dir.as_ref().filter(|_| args.save_images) {
        std::fs::create_dir_all(save_dir)
            .with_context(|| format!("Failed to create save directory: {:?}", save_dir))?;
    }

    let processor = FaceRecognitionProcessor::new(args, Arc::new(OpenCvBackend::default()))?;

    let mut loader = SourceLoader::new(&Source::from(frames.clone()))
        .with_context(|| format!("Failed to list frames in {:?}", frames))?;
    let stats = processor
        .run(&mut loader, &mut LogSink)
        .with_context(|| "Failed to run face recognition".to_string())?;

    tracing::info!(
        "Recognised {} of {} frames ({} failed)",
        stats.succeeded,
        stats.processed,
        stats.failed
    );
    Ok(())
}
