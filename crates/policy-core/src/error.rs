//! Error types for policy-core

use std::fmt;

use serde::Serialize;

use crate::store::{PolicyName, StoreError};

/// Result type for policy-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Stage of a single policy copy at which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyStage {
    /// Reading the ruleset from the source store
    Read,
    /// Writing the ruleset to the destination store
    Write,
}

impl fmt::Display for CopyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Errors that can occur while synchronizing policies
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Enumerating the source policies failed
    #[error("error listing source policies: {source}")]
    List { source: StoreError },

    /// A named source policy could not be fetched
    #[error("error reading '{name}' policy from source: {source}")]
    Read { name: PolicyName, source: StoreError },

    /// A destination write failed, including writes to a reserved policy
    #[error("error writing '{name}' policy to destination: {source}")]
    Write { name: PolicyName, source: StoreError },

    /// A bulk copy ran to the end but some policies failed
    #[error(
        "{count} of {attempted} policies failed to copy: {summary}",
        count = .failures.len(),
        summary = summarize(.failures)
    )]
    Incomplete {
        failures: Vec<Error>,
        attempted: usize,
    },

    /// A policy name was rejected before reaching any store
    #[error("invalid policy name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

impl Error {
    /// Name of the policy this error refers to, if it refers to exactly one
    pub fn policy_name(&self) -> Option<&PolicyName> {
        match self {
            Self::Read { name, .. } | Self::Write { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Copy stage at which this error happened, if it belongs to a single copy
    pub fn stage(&self) -> Option<CopyStage> {
        match self {
            Self::Read { .. } => Some(CopyStage::Read),
            Self::Write { .. } => Some(CopyStage::Write),
            _ => None,
        }
    }

    /// Underlying store error, if any
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::List { source } | Self::Read { source, .. } | Self::Write { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

fn summarize(failures: &[Error]) -> String {
    failures
        .iter()
        .map(|failure| match (failure.policy_name(), failure.stage()) {
            (Some(name), Some(stage)) => format!("{} ({})", name, stage),
            _ => failure.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
