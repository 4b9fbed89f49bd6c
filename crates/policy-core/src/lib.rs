//! Core synchronization layer for Vault Policy Copy
//!
//! This crate provides everything needed to replicate access-control policies
//! from one policy store to another, independent of the transport used to
//! reach either store:
//!
//! - **Endpoint configuration**: prefix-namespaced resolution of address,
//!   token, and CA certificate path for the source and destination endpoints
//! - **Store contract**: the [`PolicyStore`] trait and the policy value types
//! - **PolicySyncEngine**: single and bulk copy with reserved `root` exclusion
//!
//! # Architecture
//!
//! ```text
//!                 policy-cli
//!                  |       |
//!        policy-vault      |
//!                  |       |
//!                 policy-core
//! ```
//!
//! # Example
//!
//! ```ignore
//! use policy_core::{ConfigSnapshot, EndpointResolver, PolicySyncEngine};
//!
//! let snapshot = ConfigSnapshot::from_env();
//! let (source_config, destination_config) = EndpointResolver::new(&snapshot).resolve_pair();
//! // build two PolicyStore clients from the configs, then:
//! let engine = PolicySyncEngine::new(&source, &destination);
//! let report = engine.copy_all(&mut |notice: &CopyNotice| println!("{}", notice.dest_name))?;
//! ```

pub mod config;
pub mod error;
pub mod store;
pub mod sync;

pub use config::{ConfigSnapshot, Endpoint, EndpointConfig, EndpointResolver};
pub use error::{CopyStage, Error, Result};
pub use store::{PolicyName, PolicyRuleset, PolicyStore, ROOT_POLICY, StoreError, StoreResult};
pub use sync::{
    CopiedPolicy, CopyNotice, CopyObserver, CopyOptions, CopyReport, CopyRequest, FailurePolicy,
    PolicySyncEngine,
};
