use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use steward_core::StewardConfig;

/// Broker backend the binary wires in. Only the in-process backend ships
/// in-tree; a real cluster client satisfies the same capability traits
/// out-of-tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MgmtConfig {
    pub bind_addr: SocketAddr,
    pub backend: Backend,
    pub steward: StewardConfig,
}

impl Default for MgmtConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            backend: Backend::Memory,
            steward: StewardConfig::default(),
        }
    }
}

impl MgmtConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext.to_lowercase().as_str() {
            "toml" => {
                let config: MgmtConfig = toml::from_str(&contents)?;
                Ok(config)
            }
            "json" => {
                let config: MgmtConfig = serde_json::from_str(&contents)?;
                Ok(config)
            }
            _ => anyhow::bail!("Unsupported config file extension: {}", ext),
        }
    }
}
