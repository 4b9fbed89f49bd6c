//! Report and progress types for PolicySyncEngine
//!
//! Provides the notice emitted before each policy write and the report
//! returned once a copy request completes.

use serde::Serialize;

use crate::store::{PolicyName, PolicyRuleset};

/// Progress notice emitted for every policy about to be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyNotice {
    /// Policy read from the source store
    pub source_name: PolicyName,
    /// Policy about to be written on the destination store
    pub dest_name: PolicyName,
    /// Rules that will be written
    pub ruleset: PolicyRuleset,
    /// Whether the write is skipped because this is a dry run
    pub dry_run: bool,
}

/// Receives progress from a running copy.
///
/// Any `FnMut(&CopyNotice)` closure is an observer.
pub trait CopyObserver {
    /// Called once in bulk mode with every name the source listed, before
    /// any policy is copied
    fn listed(&mut self, _names: &[PolicyName]) {}

    /// Called after a policy was read and before it is written
    fn copying(&mut self, notice: &CopyNotice);
}

impl<F> CopyObserver for F
where
    F: FnMut(&CopyNotice),
{
    fn copying(&mut self, notice: &CopyNotice) {
        self(notice)
    }
}

/// One completed policy copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedPolicy {
    /// Name read on the source store
    pub source_name: PolicyName,
    /// Name written on the destination store
    pub dest_name: PolicyName,
    /// Rules that were copied
    pub ruleset: PolicyRuleset,
}

/// Report from a successful copy request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyReport {
    /// Names listed by the source (bulk mode only)
    pub listed: Vec<PolicyName>,
    /// Policies copied, in the order they were written
    pub copied: Vec<CopiedPolicy>,
    /// Reserved policies left out of a bulk copy
    pub skipped: Vec<PolicyName>,
    /// Whether writes were suppressed
    pub dry_run: bool,
}

impl CopyReport {
    /// Create a report for a bulk copy over the listed names
    pub fn listing(listed: Vec<PolicyName>, dry_run: bool) -> Self {
        Self {
            listed,
            dry_run,
            ..Self::default()
        }
    }

    /// Create a report for a single copy
    pub fn single(copied: CopiedPolicy, dry_run: bool) -> Self {
        Self {
            copied: vec![copied],
            dry_run,
            ..Self::default()
        }
    }

    /// Names written on the destination, in order
    pub fn written_names(&self) -> Vec<&PolicyName> {
        self.copied.iter().map(|copied| &copied.dest_name).collect()
    }
}
