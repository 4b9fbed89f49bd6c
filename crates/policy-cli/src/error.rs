//! Error types for policy-cli

use policy_core::Endpoint;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Exit code for configuration, connection, and copy failures
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for invalid command-line usage
pub const EXIT_USAGE: i32 = 2;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from policy-core
    #[error(transparent)]
    Core(#[from] policy_core::Error),

    /// A Vault client could not be built for one endpoint
    #[error("error creating {endpoint} Vault client: {source}")]
    Connect {
        endpoint: Endpoint,
        source: policy_vault::Error,
    },

    /// Invalid arguments, reported before any network activity
    #[error("{message}")]
    Usage { message: String },
}

impl CliError {
    /// Create a new usage error with the given message
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. } => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}
