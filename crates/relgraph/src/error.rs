//! Facade error types.

use thiserror::Error;

/// Errors raised while building or writing a [`Graph`](crate::Graph).
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the core crate.
    #[error(transparent)]
    Core(#[from] relgraph_core::Error),

    /// Failed to read a fixture file.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Fixture document is not valid JSON or has the wrong shape.
    #[error("invalid fixture: {0}")]
    Fixture(#[from] serde_json::Error),
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;
