//! Error types for disaster-zones

use thiserror::Error;

/// Main error type for disaster-zones operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid radius: {0}")]
    InvalidRadius(String),

    #[error("Unknown disaster type: {0}")]
    UnknownDisasterType(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Repository timed out after {0} ms")]
    RepositoryTimeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// Machine-readable error code, stable across versions
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::InvalidRadius(_) => "INVALID_RADIUS",
            Error::UnknownDisasterType(_) => "UNKNOWN_DISASTER_TYPE",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Repository(_) => "REPOSITORY_ERROR",
            Error::RepositoryTimeout(_) => "REPOSITORY_TIMEOUT",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Caller supplied bad input; never worth retrying
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidCoordinates(_)
                | Error::InvalidRadius(_)
                | Error::UnknownDisasterType(_)
                | Error::Validation(_)
        )
    }

    /// The backing store rejected a write, was unavailable or timed out
    pub fn is_repository(&self) -> bool {
        matches!(self, Error::Repository(_) | Error::RepositoryTimeout(_))
    }
}

/// Result type alias for disaster-zones operations
pub type Result<T> = std::result::Result<T, Error>;
