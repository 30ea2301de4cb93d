// src/error.rs
//! Error types for the gesture control library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Landmark set does not have the anatomical 21-point shape
    #[error("Invalid observation: expected {expected} landmarks, found {found}")]
    InvalidObservation { expected: usize, found: usize },

    /// A landmark carries a non-finite coordinate
    #[error("Invalid observation: landmark {index} has a non-finite coordinate")]
    InvalidLandmark { index: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Landmark source failed to deliver a frame
    #[error("Tracker error: {0}")]
    Tracker(String),

    /// Overlay, audio or render collaborator rejected a command
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// True for the malformed-input family that drops a frame without touching state.
    pub fn is_invalid_observation(&self) -> bool {
        matches!(self, Error::InvalidObservation { .. } | Error::InvalidLandmark { .. })
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
