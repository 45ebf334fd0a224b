//! Error Types
//!
//! The numeric kernels never fail. Errors only arise at the edges: parsing a
//! kind identifier that came from markup, validating quiz definitions, looking
//! up a quiz by id, and reading or writing the key-value store.

use thiserror::Error;

/// Errors raised by the fallible parts of the crate
#[derive(Error, Debug)]
pub enum LabError {
    #[error("unknown activation function: {0}")]
    UnknownActivation(String),

    #[error("unknown optimizer: {0}")]
    UnknownOptimizer(String),

    #[error("invalid quiz: {0}")]
    InvalidQuiz(String),

    #[error("no quiz registered under id '{0}'")]
    UnknownQuiz(String),

    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LabError>;
