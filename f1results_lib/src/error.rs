//! Error types for the library layer.

use std::fmt;

use crate::store::StoreError;

/// Errors produced by the library layer, wrapping archive client and storage
/// errors and adding configuration and input validation failures.
#[derive(Debug)]
pub enum F1ResultsError {
    /// An error from the archive client (fetch or layout).
    Api(f1results_api::Error),
    /// The storage backend rejected a read or write.
    Store(StoreError),
    /// User-provided input failed validation.
    InvalidInput(String),
    /// An environment setting or layout file could not be used.
    Config(String),
}

impl fmt::Display for F1ResultsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "Archive error: {}", e),
            Self::Store(e) => write!(f, "Storage error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for F1ResultsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<f1results_api::Error> for F1ResultsError {
    fn from(e: f1results_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<StoreError> for F1ResultsError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
