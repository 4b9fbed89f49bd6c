//! PolicySyncEngine for replicating policies between two stores
//!
//! This module provides:
//! - **copy_one**: Copy a single named policy, optionally under a new name
//! - **copy_all**: Copy every source policy except `root`, keeping names
//! - **execute**: Dispatch a [`CopyRequest`] to one of the above
//! - **report**: Progress notices and the report returned on success

mod engine;
mod report;

pub use engine::{CopyOptions, CopyRequest, FailurePolicy, PolicySyncEngine};
pub use report::{CopiedPolicy, CopyNotice, CopyObserver, CopyReport};
