//! Use case services for the parking pipeline
//!
//! Services orchestrate domain logic, repositories, and the vision
//! pipeline. Errors are mapped to a service taxonomy that corresponds to
//! caller-facing outcomes: invalid input, not found, conflict, unauthorized,
//! storage failure.

mod ingestion_service;
mod session_service;
mod tariff_service;

pub use ingestion_service::{IngestPhotoOutcome, IngestionService};
pub use session_service::{ExitReceipt, SessionService};
pub use tariff_service::TariffService;

use thiserror::Error;

use parqueo_types::Error as CoreError;

/// Errors surfaced by the use case services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) | CoreError::InvalidImageFormat(msg) => {
                ServiceError::InvalidInput(msg)
            }
            CoreError::Image(e) => ServiceError::InvalidInput(e.to_string()),
            CoreError::NotFound(msg) => ServiceError::NotFound(msg),
            CoreError::FileNotFound(msg) => ServiceError::NotFound(msg),
            CoreError::Conflict(msg) => ServiceError::Conflict(msg),
            CoreError::Unauthorized(msg) => ServiceError::Unauthorized(msg),
            other => ServiceError::Storage(other.to_string()),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
