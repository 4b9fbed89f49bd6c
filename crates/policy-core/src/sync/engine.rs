//! PolicySyncEngine implementation
//!
//! The engine reads policies from a source store and writes them to a
//! destination store. Every copy is a plain read followed by an unconditional
//! overwrite; nothing is backed up, diffed, or retried.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::store::{PolicyName, PolicyStore, StoreError};
use crate::{Error, Result};

use super::report::{CopiedPolicy, CopyNotice, CopyObserver, CopyReport};

/// What a bulk copy does after one policy fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop at the first failure. Policies already written stay written.
    #[default]
    FailFast,
    /// Attempt every policy, then fail with every collected error
    Continue,
}

/// Options for copy operations
#[derive(Debug, Clone, Default)]
pub struct CopyOptions {
    /// Behaviour of a bulk copy after a failed policy
    pub failure_policy: FailurePolicy,
    /// If true, read and report every policy without writing anything
    pub dry_run: bool,
}

/// A single invocation of the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyRequest {
    /// Copy every source policy except `root`, keeping names
    All,
    /// Copy one policy, possibly under a different name
    Single {
        source_name: PolicyName,
        dest_name: PolicyName,
    },
}

/// Engine for replicating policies from a source store to a destination store
///
/// The PolicySyncEngine provides two operations:
/// - **copy_one**: Read one source policy and write it to the destination
/// - **copy_all**: List the source, skip `root`, and copy the rest in order
///
/// The engine holds no state between calls. Both stores are borrowed for the
/// lifetime of the engine and used strictly sequentially.
pub struct PolicySyncEngine<'a, S: ?Sized, D: ?Sized> {
    /// Store policies are read from
    source: &'a S,
    /// Store policies are written to
    destination: &'a D,
    /// Failure and dry-run behaviour
    options: CopyOptions,
}

impl<'a, S, D> PolicySyncEngine<'a, S, D>
where
    S: PolicyStore + ?Sized,
    D: PolicyStore + ?Sized,
{
    /// Create an engine with default options (fail-fast, writes enabled)
    pub fn new(source: &'a S, destination: &'a D) -> Self {
        Self {
            source,
            destination,
            options: CopyOptions::default(),
        }
    }

    /// Replace the engine options
    pub fn with_options(mut self, options: CopyOptions) -> Self {
        self.options = options;
        self
    }

    /// Current engine options
    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Run a copy request
    ///
    /// # Errors
    ///
    /// Returns the error of [`Self::copy_all`] or [`Self::copy_one`].
    pub fn execute(
        &self,
        request: &CopyRequest,
        observer: &mut dyn CopyObserver,
    ) -> Result<CopyReport> {
        match request {
            CopyRequest::All => self.copy_all(observer),
            CopyRequest::Single {
                source_name,
                dest_name,
            } => {
                let copied = self.copy_one(source_name, dest_name, observer)?;
                Ok(CopyReport::single(copied, self.options.dry_run))
            }
        }
    }

    /// Copy one policy from the source to the destination
    ///
    /// Any existing destination policy named `dest_name` is overwritten.
    ///
    /// # Errors
    ///
    /// - [`Error::Write`] with [`StoreError::Reserved`] if `dest_name` is
    ///   `root`; neither store is called in that case
    /// - [`Error::Read`] if the source policy is missing or cannot be fetched
    /// - [`Error::Write`] if the destination rejects the write
    pub fn copy_one(
        &self,
        source_name: &PolicyName,
        dest_name: &PolicyName,
        observer: &mut dyn CopyObserver,
    ) -> Result<CopiedPolicy> {
        if dest_name.is_root() {
            return Err(Error::Write {
                name: dest_name.clone(),
                source: StoreError::Reserved {
                    name: dest_name.to_string(),
                },
            });
        }

        let ruleset = self
            .source
            .get_policy(source_name)
            .map_err(|source| Error::Read {
                name: source_name.clone(),
                source,
            })?;

        let notice = CopyNotice {
            source_name: source_name.clone(),
            dest_name: dest_name.clone(),
            ruleset,
            dry_run: self.options.dry_run,
        };
        info!(
            source = %source_name,
            destination = %dest_name,
            rules = %notice.ruleset,
            dry_run = self.options.dry_run,
            "Copying policy"
        );
        observer.copying(&notice);

        if self.options.dry_run {
            debug!(destination = %dest_name, "Dry run, skipping write");
        } else {
            self.destination
                .put_policy(dest_name, &notice.ruleset)
                .map_err(|source| Error::Write {
                    name: dest_name.clone(),
                    source,
                })?;
        }

        Ok(CopiedPolicy {
            source_name: notice.source_name,
            dest_name: notice.dest_name,
            ruleset: notice.ruleset,
        })
    }

    /// Copy every source policy except `root`, keeping each name
    ///
    /// Policies are copied in listing order, one at a time. The copy is not
    /// transactional: under [`FailurePolicy::FailFast`] the first failure is
    /// returned and policies written before it stay in place.
    ///
    /// # Errors
    ///
    /// - [`Error::List`] if the source cannot be enumerated
    /// - the first [`Error::Read`] or [`Error::Write`] under
    ///   [`FailurePolicy::FailFast`]
    /// - [`Error::Incomplete`] with every failure under
    ///   [`FailurePolicy::Continue`]
    pub fn copy_all(&self, observer: &mut dyn CopyObserver) -> Result<CopyReport> {
        let listed = self
            .source
            .list_policies()
            .map_err(|source| Error::List { source })?;

        debug!(count = listed.len(), "Listed source policies");
        observer.listed(&listed);

        let mut report = CopyReport::listing(listed.clone(), self.options.dry_run);
        let mut failures = Vec::new();

        for name in &listed {
            if name.is_root() {
                debug!(policy = %name, "Skipping reserved policy");
                report.skipped.push(name.clone());
                continue;
            }

            match self.copy_one(name, name, observer) {
                Ok(copied) => report.copied.push(copied),
                Err(error) => match self.options.failure_policy {
                    FailurePolicy::FailFast => return Err(error),
                    FailurePolicy::Continue => {
                        warn!(policy = %name, %error, "Policy copy failed, continuing");
                        failures.push(error);
                    }
                },
            }
        }

        if !failures.is_empty() {
            return Err(Error::Incomplete {
                attempted: report.copied.len() + failures.len(),
                failures,
            });
        }

        Ok(report)
    }
}
