//! Copy command implementation
//!
//! Resolves both endpoints, builds one Vault client per endpoint, and runs
//! the sync engine with a progress printer attached.

use colored::Colorize;
use policy_core::{
    ConfigSnapshot, CopyNotice, CopyObserver, CopyOptions, CopyReport, CopyRequest, Endpoint,
    EndpointResolver, Error, PolicyName, PolicySyncEngine,
};
use policy_vault::VaultClient;

use crate::error::{CliError, Result};

/// Build the Vault client for one endpoint from the snapshot
///
/// # Errors
///
/// Returns [`CliError::Connect`] if the endpoint config cannot produce a client.
pub fn connect(snapshot: &ConfigSnapshot, endpoint: Endpoint) -> Result<VaultClient> {
    let config = EndpointResolver::new(snapshot).resolve_endpoint(endpoint);
    tracing::debug!(%endpoint, ?config, "Creating Vault client");
    VaultClient::new(&config).map_err(|source| CliError::Connect { endpoint, source })
}

/// Run the copy command
///
/// Copies one policy or every policy from the source Vault to the destination
/// Vault, printing a notice for each policy.
pub fn run_copy(
    snapshot: &ConfigSnapshot,
    request: &CopyRequest,
    options: CopyOptions,
) -> Result<CopyReport> {
    let source = connect(snapshot, Endpoint::Source)?;
    let destination = connect(snapshot, Endpoint::Destination)?;

    let engine = PolicySyncEngine::new(&source, &destination).with_options(options);
    let report = match engine.execute(request, &mut ProgressPrinter) {
        Ok(report) => report,
        Err(Error::Incomplete {
            failures,
            attempted,
        }) => {
            eprintln!();
            eprintln!("{} Some policies failed to copy:", "ERROR".red().bold());
            for failure in &failures {
                eprintln!("   {} {}", "!".red(), failure);
            }
            return Err(Error::Incomplete {
                failures,
                attempted,
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    print_summary(&report);
    Ok(report)
}

/// Prints engine progress to stdout
struct ProgressPrinter;

impl CopyObserver for ProgressPrinter {
    fn listed(&mut self, names: &[PolicyName]) {
        let names: Vec<&str> = names.iter().map(PolicyName::as_str).collect();
        println!(
            "{} Copying the following policies in source Vault to destination Vault: {}",
            "=>".blue().bold(),
            names.join(", ").cyan()
        );
    }

    fn copying(&mut self, notice: &CopyNotice) {
        let verb = if notice.dry_run {
            "[dry-run] would copy"
        } else {
            "copying"
        };
        println!();
        println!(
            "{} {} `{}` policy in source Vault to `{}` policy in destination Vault",
            "=>".blue().bold(),
            verb,
            notice.source_name.as_str().cyan(),
            notice.dest_name.as_str().cyan()
        );
        println!("source Vault policy `{}` rules:", notice.source_name);
        println!("{}", notice.ruleset.as_str().dimmed());
    }
}

fn print_summary(report: &CopyReport) {
    println!();
    if report.dry_run {
        println!(
            "{} Dry run complete. {} policies would be copied.",
            "OK".green().bold(),
            report.copied.len()
        );
    } else if report.copied.is_empty() {
        println!("{} No policies to copy.", "OK".green().bold());
    } else {
        println!(
            "{} Copied {} policies:",
            "OK".green().bold(),
            report.copied.len()
        );
        for copied in &report.copied {
            println!(
                "   {} {} -> {}",
                "+".green(),
                copied.source_name,
                copied.dest_name
            );
        }
    }
    for skipped in &report.skipped {
        println!("   {} {} (reserved, skipped)", "-".yellow(), skipped);
    }
}
