//! CLI argument parsing using clap derive

use clap::Parser;
use policy_core::{CopyOptions, CopyRequest, FailurePolicy, PolicyName};

use crate::error::{CliError, Result};

const AFTER_HELP: &str = "\
Examples:
  # copy all policies from the source Vault to the destination Vault.
  # destination policies with the same names are overwritten.
  vault-policy-cp

  # copy the allow_read policy from the source Vault to the destination Vault.
  # a destination policy with the same name is overwritten.
  vault-policy-cp allow_read allow_read

  # copy allow_read under a new name
  vault-policy-cp allow_read allow_read_copy

The root policy is never copied in bulk mode and can never be a destination.

Environment:
  SOURCE_VAULT_ADDR, SOURCE_VAULT_TOKEN, SOURCE_VAULT_CACERT
  DESTINATION_VAULT_ADDR, DESTINATION_VAULT_TOKEN, DESTINATION_VAULT_CACERT";

/// Copy Vault policies from a source Vault to a destination Vault
#[derive(Parser, Debug)]
#[command(name = "vault-policy-cp")]
#[command(version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Cli {
    /// Source and destination policy names; omit both to copy every policy
    #[arg(value_name = "POLICY")]
    pub policies: Vec<String>,

    /// Read and report policies without writing to the destination
    #[arg(long)]
    pub dry_run: bool,

    /// In bulk mode, keep copying after a failure and report all failures
    #[arg(long)]
    pub keep_going: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The copy request described by the positional arguments
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Usage`] unless exactly zero or two non-empty policy
    /// names were given.
    pub fn request(&self) -> Result<CopyRequest> {
        match self.policies.as_slice() {
            [] => Ok(CopyRequest::All),
            [source, destination] => Ok(CopyRequest::Single {
                source_name: policy_name(source)?,
                dest_name: policy_name(destination)?,
            }),
            other => Err(CliError::usage(format!(
                "invalid number of arguments: {}. expected 0 or 2 arguments.",
                other.len()
            ))),
        }
    }

    /// Engine options selected by the flags
    pub fn options(&self) -> CopyOptions {
        CopyOptions {
            failure_policy: if self.keep_going {
                FailurePolicy::Continue
            } else {
                FailurePolicy::FailFast
            },
            dry_run: self.dry_run,
        }
    }
}

fn policy_name(value: &str) -> Result<PolicyName> {
    PolicyName::new(value).map_err(|e| CliError::usage(e.to_string()))
}
