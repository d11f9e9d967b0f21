//! Typed error type shared by the port and every store built on it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The row, or a referenced parent row, does not exist.
    #[error("row not found")]
    NotFound,

    /// The underlying backend rejected the call.
    #[error("persistence backend error: {message}")]
    Backend { message: String },

    /// A row failed to (de)serialize at the store boundary.
    #[error("row codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl StoreError {
    /// Shorthand for a backend failure with a plain message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into() }
    }
}
