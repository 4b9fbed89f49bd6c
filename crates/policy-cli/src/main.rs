//! Vault policy copier CLI
//!
//! Copies ACL policies from a source Vault server to a destination Vault
//! server. Endpoints are configured through `SOURCE_VAULT_*` and
//! `DESTINATION_VAULT_*` environment variables.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use policy_core::ConfigSnapshot;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::Cli;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        if matches!(e, CliError::Usage { .. }) {
            eprintln!("Run {} for usage.", "vault-policy-cp --help".cyan());
        }
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!("Verbose mode enabled");
        }
    }

    // Arguments are validated before any configuration is read
    let request = cli.request()?;
    let snapshot = ConfigSnapshot::from_env();

    commands::run_copy(&snapshot, &request, cli.options())?;
    Ok(())
}
