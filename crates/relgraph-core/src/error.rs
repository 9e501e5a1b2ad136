//! Core error types.
//!
//! Resolution never fails; these errors come from writing fixtures into the
//! in-memory store and from loading schema/config documents.

use thiserror::Error;

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Entity type is not declared in the schema.
    #[error("unknown entity type '{0}'")]
    UnknownEntity(String),

    /// Record lacks a usable value for its identity field.
    #[error("record of type '{entity}' has no usable identity field '{field}'")]
    MissingIdentity { entity: String, field: String },

    /// Invalid data format.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
