//! Error types for census-core

use thiserror::Error;

/// Result type alias using census-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in census-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A recognized setting was supplied with the wrong type.
    ///
    /// Raised before any store interaction takes place.
    #[error("invalid setting '{key}': expected {expected}")]
    Configuration { key: String, expected: &'static str },

    /// The store endpoint could not be reached within the connect timeout
    #[error("failed to connect to '{uri}': {reason}")]
    Connection { uri: String, reason: String },

    /// A single find/insert/update call against the store failed
    #[error("store operation failed: {0}")]
    Store(#[from] libsql::Error),

    /// A stored document or an input value could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A filter condition used a non-scalar value
    #[error("unsupported filter value for field '{0}'")]
    UnsupportedFilter(String),

    /// A field name the JSON path layer cannot address
    #[error("unsupported field name '{0}'")]
    UnsupportedField(String),
}
