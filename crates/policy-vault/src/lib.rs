//! Vault HTTP policy store for Vault Policy Copy
//!
//! Implements [`policy_core::PolicyStore`] over the Vault ACL policy API
//! (`/v1/sys/policies/acl`) with a blocking `reqwest` client. A client is
//! built from one [`policy_core::EndpointConfig`]; building fails for an
//! unusable address or CA certificate, before any request is sent.

pub mod api;
pub mod client;
pub mod error;

pub use client::{REQUEST_TIMEOUT, TOKEN_HEADER, VaultClient};
pub use error::{Error, Result};
