//! Policy store contract
//!
//! A policy store is anything that can list, read, and write named policy
//! rulesets. The sync engine only depends on [`PolicyStore`]; transports such
//! as the Vault HTTP API live in their own crates.

use std::fmt;

use serde::Serialize;

use crate::{Error, Result};

/// Name of the built-in policy that no store accepts writes for
pub const ROOT_POLICY: &str = "root";

/// Result type for policy store calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors reported by a policy store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The requested policy does not exist
    #[error("policy '{name}' not found")]
    NotFound { name: String },

    /// The policy is reserved and cannot be written
    #[error("policy '{name}' is reserved and cannot be written")]
    Reserved { name: String },

    /// The store rejected the credentials
    #[error("permission denied: {message}")]
    Unauthorized { message: String },

    /// The store answered with an unexpected status
    #[error("store returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The store could not be reached
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The store answered with a body that could not be understood
    #[error("invalid response: {message}")]
    Decode { message: String },
}

/// A non-empty policy identifier, unique within one store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PolicyName(String);

impl PolicyName {
    /// Create a policy name
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if the name is empty.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidName {
                name,
                reason: "policy names must not be empty".to_string(),
            });
        }
        Ok(Self(name))
    }

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the reserved `root` policy (exact, case-sensitive match)
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_POLICY
    }
}

impl fmt::Display for PolicyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PolicyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for PolicyName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for PolicyName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

/// The rules of one policy, carried as an uninterpreted value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PolicyRuleset(String);

impl PolicyRuleset {
    /// Wrap raw policy rules
    pub fn new(rules: impl Into<String>) -> Self {
        Self(rules.into())
    }

    /// The rules as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the ruleset, returning the raw rules
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PolicyRuleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PolicyRuleset {
    fn from(rules: String) -> Self {
        Self(rules)
    }
}

impl From<&str> for PolicyRuleset {
    fn from(rules: &str) -> Self {
        Self(rules.to_string())
    }
}

/// Capability to list, read, and write policies on one store.
///
/// Implementations are used by a single logical flow at a time and need no
/// internal locking beyond what their transport requires.
pub trait PolicyStore {
    /// List the names of all policies, in the order the store reports them
    fn list_policies(&self) -> StoreResult<Vec<PolicyName>>;

    /// Read the ruleset of a named policy
    ///
    /// Returns [`StoreError::NotFound`] when the policy does not exist.
    fn get_policy(&self, name: &PolicyName) -> StoreResult<PolicyRuleset>;

    /// Create or overwrite a named policy
    fn put_policy(&self, name: &PolicyName, rules: &PolicyRuleset) -> StoreResult<()>;
}

impl<T: PolicyStore + ?Sized> PolicyStore for &T {
    fn list_policies(&self) -> StoreResult<Vec<PolicyName>> {
        (**self).list_policies()
    }

    fn get_policy(&self, name: &PolicyName) -> StoreResult<PolicyRuleset> {
        (**self).get_policy(name)
    }

    fn put_policy(&self, name: &PolicyName, rules: &PolicyRuleset) -> StoreResult<()> {
        (**self).put_policy(name, rules)
    }
}

impl<T: PolicyStore + ?Sized> PolicyStore for Box<T> {
    fn list_policies(&self) -> StoreResult<Vec<PolicyName>> {
        (**self).list_policies()
    }

    fn get_policy(&self, name: &PolicyName) -> StoreResult<PolicyRuleset> {
        (**self).get_policy(name)
    }

    fn put_policy(&self, name: &PolicyName, rules: &PolicyRuleset) -> StoreResult<()> {
        (**self).put_policy(name, rules)
    }
}
