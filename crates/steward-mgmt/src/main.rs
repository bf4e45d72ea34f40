use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use steward_mgmt::{build_backend, Cli, Command, MgmtConfig, MigrationPlan, StewardApi};
use steward_core::{MigrationLedger, TopicSteward};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        MgmtConfig::from_file(&cli.config)?
    } else {
        tracing::warn!(
            "Config file not found, using defaults: {}",
            cli.config.display()
        );
        MgmtConfig::default()
    };

    let cluster = build_backend(&config).await;
    let steward = Arc::new(TopicSteward::new(
        cluster.clone(),
        config.steward.clone(),
    ));
    let ledger = MigrationLedger::new(cluster.clone(), cluster.clone(), &config.steward);

    match cli.command {
        Command::Apply { json_input } => {
            let plan = MigrationPlan::from_file(&json_input)?;
            let report = steward_mgmt::run_migration(
                &plan,
                &steward,
                &ledger,
                config.steward.ledger_read_timeout(),
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.success {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Delete { topic, dry_run } => {
            let outcome = steward.delete_topic(&topic, dry_run).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.allowed {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Info { topic } => {
            let snapshot = steward.inspector().snapshot_topic(&topic).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot.config)?);
            Ok(())
        }
        Command::Serve => {
            let api = StewardApi::new(steward);
            api.serve(config.bind_addr).await
        }
    }
}
