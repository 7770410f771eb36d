//! Domain error types for the bill submission flow
//!
//! Validation failures are handled locally and never cause a network call.
//! Store failures are never retried and always surfaced to the user.

use thiserror::Error;

/// A problem with the draft itself, caught before any store call is issued.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unsupported attachment type for '{0}'. Accepted: png, jpg, jpeg")]
    UnsupportedFileType(String),

    #[error("Invalid date '{0}'. Use YYYY-MM-DD or DD/MM/YYYY")]
    InvalidDate(String),

    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("Invalid percentage '{0}'")]
    InvalidPct(String),
}

/// A failure reported by the backing store. `Api` displays exactly the
/// message text the backend renders for the status.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Erreur {status}")]
    Api { status: u16 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No active session. Run 'billed login <email>' first")]
    MissingSession,
}

impl StoreError {
    pub fn api(status: u16) -> Self {
        StoreError::Api { status }
    }
}

/// Errors surfaced by the new-bill form controller.
#[derive(Error, Debug)]
pub enum NewBillError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NewBillError {
    /// True when the error blocked submission before any store call.
    pub fn is_validation(&self) -> bool {
        matches!(self, NewBillError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_renders_backend_message() {
        assert_eq!(StoreError::api(404).to_string(), "Erreur 404");
        assert_eq!(StoreError::api(500).to_string(), "Erreur 500");
    }

    #[test]
    fn api_error_keeps_its_status() {
        match StoreError::api(404) {
            StoreError::Api { status } => assert_eq!(status, 404),
            other => panic!("expected Api, got {:?}", other),
        }
    }

    #[test]
    fn validation_error_names_the_field() {
        let err = ValidationError::MissingField("amount");
        assert!(err.to_string().contains("amount"));
    }
}
