use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum AppError {
    #[error("TOML config file error: {0}")]
    TomlConfig(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unknown recognition algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Cannot parse label from training file {path:?}: {reason}")]
    Labeling { path: PathBuf, reason: String },

    #[error("Training set is empty: no jpg/pgm/png files in {0:?}")]
    EmptyTrainingSet(PathBuf),

    #[error("Image loading failed: {0}")]
    ImageLoad(String),

    #[error("Model training failed: {0}")]
    Train(String),

    #[error("Image decoding failed: {0}")]
    Decode(String),

    #[error("Image encoding failed: {0}")]
    Encode(String),

    #[error("Face prediction failed: {0}")]
    Predict(String),
}

/// Result type with default AppError
pub type Result<T, E = AppError> = std::result::Result<T, E>;
