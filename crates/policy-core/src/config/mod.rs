//! Endpoint configuration resolution
//!
//! Each side of a copy (source and destination) is configured through its own
//! namespace of keys. A namespace is a prefix joined to three fixed suffixes:
//!
//! | Key | Field |
//! |---|---|
//! | `<PREFIX>VAULT_ADDR` | endpoint address |
//! | `<PREFIX>VAULT_TOKEN` | auth token |
//! | `<PREFIX>VAULT_CACERT` | CA certificate path |
//!
//! The prefixes are `SOURCE_` and `DESTINATION_`. Resolution reads from an
//! immutable [`ConfigSnapshot`] so it can run against fixtures as easily as
//! against the process environment.
//!
//! # Example
//!
//! ```ignore
//! use policy_core::config::{ConfigSnapshot, Endpoint, EndpointResolver};
//!
//! let snapshot = ConfigSnapshot::from_env();
//! let resolver = EndpointResolver::new(&snapshot);
//! let source = resolver.resolve_endpoint(Endpoint::Source);
//! ```

mod endpoint;
mod resolver;

pub use endpoint::{Endpoint, EndpointConfig};
pub use resolver::{
    ADDRESS_SUFFIX, CA_CERT_SUFFIX, ConfigSnapshot, EndpointResolver, TOKEN_SUFFIX,
};
