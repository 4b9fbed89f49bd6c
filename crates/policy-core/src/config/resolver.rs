//! Prefix-namespaced endpoint resolution over a configuration snapshot

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use super::endpoint::{Endpoint, EndpointConfig};

/// Key suffix holding the endpoint address
pub const ADDRESS_SUFFIX: &str = "VAULT_ADDR";

/// Key suffix holding the auth token
pub const TOKEN_SUFFIX: &str = "VAULT_TOKEN";

/// Key suffix holding the CA certificate path
pub const CA_CERT_SUFFIX: &str = "VAULT_CACERT";

/// An immutable set of configuration key/value pairs.
///
/// Empty values are treated the same as absent ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    values: BTreeMap<String, String>,
}

impl ConfigSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    pub fn from_env() -> Self {
        std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Build a snapshot from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Look up a key, returning `None` for absent or empty values
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Number of keys in the snapshot
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the snapshot holds no keys
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Resolves endpoint configurations from a snapshot.
///
/// Resolution never fails: absent keys become empty fields, and no address
/// or token validation happens here.
pub struct EndpointResolver<'a> {
    snapshot: &'a ConfigSnapshot,
}

impl<'a> EndpointResolver<'a> {
    /// Create a resolver over the given snapshot
    pub fn new(snapshot: &'a ConfigSnapshot) -> Self {
        Self { snapshot }
    }

    /// Resolve the config stored under `prefix`
    ///
    /// # Example
    ///
    /// ```ignore
    /// // reads SOURCE_VAULT_ADDR, SOURCE_VAULT_TOKEN, SOURCE_VAULT_CACERT
    /// let config = resolver.resolve("SOURCE_");
    /// ```
    pub fn resolve(&self, prefix: &str) -> EndpointConfig {
        let lookup = |suffix: &str| self.snapshot.get(&format!("{prefix}{suffix}"));

        let address = lookup(ADDRESS_SUFFIX).unwrap_or_default();
        let token = lookup(TOKEN_SUFFIX).unwrap_or_default();
        let ca_cert_path = lookup(CA_CERT_SUFFIX).map(PathBuf::from);

        debug!(
            prefix,
            address,
            has_token = !token.is_empty(),
            ca_cert = ?ca_cert_path,
            "Resolved endpoint configuration"
        );

        EndpointConfig::new(address, token, ca_cert_path)
    }

    /// Resolve the config for one side of the copy
    pub fn resolve_endpoint(&self, endpoint: Endpoint) -> EndpointConfig {
        self.resolve(endpoint.prefix())
    }

    /// Resolve the source and destination configs, each independently
    pub fn resolve_pair(&self) -> (EndpointConfig, EndpointConfig) {
        (
            self.resolve_endpoint(Endpoint::Source),
            self.resolve_endpoint(Endpoint::Destination),
        )
    }
}
