//! Shared test utilities for the vault-policy-cp workspace.
//!
//! This crate provides policy store fixtures at two realism levels. It is a
//! dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`memory`]: [`MemoryPolicyStore`], an in-process store with failure injection
//! - [`vault`]: [`FakeVault`], a local HTTP server speaking the Vault ACL policy API

pub mod memory;
pub mod vault;

pub use memory::MemoryPolicyStore;
pub use vault::{FakeVault, RecordedRequest};
