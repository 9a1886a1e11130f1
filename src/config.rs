use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub listen_host: String,
    pub listen_port: u16,
    /// Single KRaft metadata log segment read once at startup.
    pub metadata_log_path: PathBuf,
    /// Longest a connection may wait on a socket read or write.
    pub idle_timeout_ms: u64,
    pub max_message_size: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            listen_host: "0.0.0.0".to_string(),
            listen_port: 9092,
            metadata_log_path: PathBuf::from(
                "/tmp/kraft-combined-logs/__cluster_metadata-0/00000000000000000000.log",
            ),
            idle_timeout_ms: 30_000,
            max_message_size: 10_485_760, // 10MB
        }
    }
}

impl BrokerConfig {
    /// Reads a JSON config file; fields left out keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}
