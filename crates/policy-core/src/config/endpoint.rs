//! Endpoint identity and connection parameters

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// One side of a policy copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// The store policies are read from
    Source,
    /// The store policies are written to
    Destination,
}

impl Endpoint {
    /// Both endpoints, source first
    pub const ALL: [Endpoint; 2] = [Endpoint::Source, Endpoint::Destination];

    /// Configuration key prefix for this endpoint
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Source => "SOURCE_",
            Self::Destination => "DESTINATION_",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

/// Connection parameters for one policy store endpoint.
///
/// Values are taken as-is: an empty address or token is kept empty and only
/// fails once a client is built or the store is called. The struct has no
/// setters, so a resolved config cannot change after construction.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EndpointConfig {
    address: String,
    token: String,
    ca_cert_path: Option<PathBuf>,
}

impl EndpointConfig {
    /// Create a config from explicit values
    pub fn new(
        address: impl Into<String>,
        token: impl Into<String>,
        ca_cert_path: Option<PathBuf>,
    ) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            ca_cert_path,
        }
    }

    /// Endpoint address, e.g. `https://vault.example.com:8200`
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Auth token sent with every store call
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Custom CA certificate used to verify the endpoint, if configured
    pub fn ca_cert_path(&self) -> Option<&Path> {
        self.ca_cert_path.as_deref()
    }

    /// Whether an address was configured at all
    pub fn has_address(&self) -> bool {
        !self.address.is_empty()
    }

    /// Whether a token was configured at all
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("EndpointConfig")
            .field("address", &self.address)
            .field("token", &token)
            .field("ca_cert_path", &self.ca_cert_path)
            .finish()
    }
}
