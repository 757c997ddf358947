//! Error types for parqueo

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

/// Error taxonomy for the parking pipeline.
///
/// `Validation` is caller-fixable input (4xx-class), `NotFound` a missing
/// session or photo (404-class), `Conflict` a duplicate Active session or a
/// repeated close (409-class), `Infrastructure` a storage failure (500-class).
/// A failed plate recognition is never an `Error`: it is a structured
/// [`crate::RecognitionResult`] with `needs_correction` set.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
