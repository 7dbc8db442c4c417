//! # sumaprobe
//!
//! Command-line session probe and patch scheduler for SUSE Manager /
//! Uyuni servers. `probe` runs the login / channel-listing / logout
//! sequence; `systems` and `schedule` drive the patch endpoints on the
//! same session skeleton.

mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sumaprobe_api_core::{patch, probe, ApiClient};

#[derive(Debug, Parser)]
#[command(
    name = "sumaprobe",
    version,
    about = "Session probe and patch scheduling for SUSE Manager / Uyuni servers"
)]
struct Cli {
    #[command(flatten)]
    connection: config::ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in, list all software channels, and log out again
    Probe,
    /// List active systems and their outstanding updates
    Systems,
    /// Schedule package-install jobs for systems with outstanding updates
    Schedule {
        /// Hours from now for the earliest job occurrence
        #[arg(long, default_value_t = 2)]
        in_hours: i64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.connection.resolve()?;
    tracing::debug!(server = %config.server, timeout_secs = config.timeout_secs, "configuration resolved");

    let client = ApiClient::from_config(&config)?;
    let credentials = config.credentials();

    match cli.command {
        Command::Probe => {
            let report = probe::run(&client, &credentials, &config.retry).await?;
            output::print_probe_report(&report);
            if !report.outcome.is_success() {
                std::process::exit(1);
            }
        }
        Command::Systems => {
            let states = patch::inspect_systems(&client, &credentials).await?;
            output::print_system_table(&states);
        }
        Command::Schedule { in_hours } => {
            let scheduled = patch::schedule_updates(&client, &credentials, in_hours).await?;
            output::print_scheduled_jobs(&scheduled);
        }
    }

    Ok(())
}
