//! Error types for ragchat-vector.

use thiserror::Error;

/// Result type for ragchat-vector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the vector database.
#[derive(Error, Debug)]
pub enum Error {
    /// A collection with this name is already open.
    #[error("Collection '{0}' already exists")]
    CollectionExists(String),

    /// No collection with this name.
    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    /// Vector length differs from the collection's dimensions.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensions of the collection.
        expected: usize,
        /// Dimensions of the offending vector.
        actual: usize,
    },

    /// Empty vector, zero dimensions, or NaN/Inf components.
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// The index reached its configured capacity.
    #[error("Index is full ({capacity} vectors)")]
    CapacityExceeded {
        /// Configured maximum.
        capacity: usize,
    },

    /// Serialization or layout problem in the data directory.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
