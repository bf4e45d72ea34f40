use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "steward")]
#[command(about = "Guarded Kafka topic delete/recreate with an idempotent migration ledger", long_about = None)]
pub struct Cli {
    /// Steward configuration file (toml or json).
    #[arg(short, long, default_value = "/etc/steward/steward.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read a migration plan and recreate its topics unless the plan uid
    /// was already applied. Exit status reflects overall batch success.
    Apply {
        #[arg(long, default_value = "./topics.json")]
        json_input: PathBuf,
    },
    /// Guarded delete of a single topic.
    Delete {
        topic: String,
        #[arg(long)]
        dry_run: bool,
    },
    /// Show full and non-default configuration of a topic.
    Info { topic: String },
    /// Serve the admin HTTP API.
    Serve,
}
