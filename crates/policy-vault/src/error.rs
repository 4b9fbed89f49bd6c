//! Error types for policy-vault

use std::path::PathBuf;

/// Result type for policy-vault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a Vault client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No address was configured
    #[error("no Vault address configured")]
    MissingAddress,

    /// The configured address is not a usable base URL
    #[error("invalid Vault address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The CA certificate file could not be read
    #[error("failed to read CA certificate {path}: {source}")]
    CaCertRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The CA certificate file holds no usable certificate
    #[error("invalid CA certificate {path}: {reason}")]
    CaCertInvalid { path: PathBuf, reason: String },

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
