//! # Engine errors
//!
//! Everything that can go wrong is either a configuration problem caught
//! before the first turn, or a failure reported by the byte-stream store.
//! The generation step itself has no error path.

use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid startup parameters
    #[error("Configuration error: {0}")]
    Config(String),

    /// The input source supplied the wrong number of cells
    #[error("Grid {width}x{height} needs {expected} cells but the input supplied {actual}")]
    Dimensions {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// A cell byte that is neither the alive nor the dead marker
    #[error("Byte {value:#04x} at ({x}, {y}) is not a valid cell marker")]
    InvalidCell { x: usize, y: usize, value: u8 },

    /// IO error from a grid store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed stored image
    #[error("Format error: {0}")]
    Format(String),

    /// The image codec could not read or write a stored grid
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// A spawned task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The IO service thread is gone
    #[error("IO service has shut down")]
    IoClosed,
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a format error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}
