use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration handed explicitly to every orchestrator; nothing in the
/// core reads the environment or process-wide globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StewardConfig {
    pub bootstrap_servers: Vec<String>,
    /// Timeout for metadata and describe calls against the cluster.
    pub operation_timeout_secs: u64,
    /// Delay between existence re-checks while confirming a delete.
    pub poll_interval_ms: u64,
    /// Maximum existence re-checks before the delete is declared timed out.
    pub max_delete_checks: u32,
    /// Single-partition control topic holding the migration ledger.
    pub ledger_topic: String,
    /// Fixed record key identifying the migration series.
    pub ledger_key: String,
    /// Consumer group used for ledger read cursors.
    pub ledger_group: String,
    pub ledger_read_timeout_secs: u64,
}

impl Default for StewardConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: vec![String::from("localhost:9092")],
            operation_timeout_secs: 10,
            poll_interval_ms: 200,
            max_delete_checks: 50,
            ledger_topic: String::from("uids"),
            ledger_key: String::from("latest-applied"),
            ledger_group: String::from("topic-steward"),
            ledger_read_timeout_secs: 2,
        }
    }
}

impl StewardConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn ledger_read_timeout(&self) -> Duration {
        Duration::from_secs(self.ledger_read_timeout_secs)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext.to_lowercase().as_str() {
            "toml" => {
                let config: StewardConfig = toml::from_str(&contents)?;
                Ok(config)
            }
            "json" => {
                let config: StewardConfig = serde_json::from_str(&contents)?;
                Ok(config)
            }
            _ => anyhow::bail!("Unsupported config file extension: {}", ext),
        }
    }
}
