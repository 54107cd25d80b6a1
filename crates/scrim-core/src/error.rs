//! Error types for scrim.

use thiserror::Error;

/// The main error type for scrim operations.
#[derive(Error, Debug)]
pub enum ScrimError {
    /// A persisted layout blob could not be parsed.
    #[error("layout data malformed: {0}")]
    MalformedLayout(String),

    /// The in-memory layout could not be serialized.
    #[error("layout serialization failed: {0}")]
    LayoutSerialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A specialized Result type for scrim operations.
pub type Result<T> = std::result::Result<T, ScrimError>;
