use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::trace::Operation;

/// One traced node: where its trace is written and what to index from it.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Stamped on every row written for this chain.
    pub name: String,
    /// File (or FIFO) the node writes its store trace to.
    pub trace_path: PathBuf,
    /// Store modules to run. Omitted means the default set.
    #[serde(default)]
    pub processors_enabled: Option<Vec<String>>,
    /// Operations forwarded by the watcher. Omitted or empty means all.
    #[serde(default)]
    pub watched_ops: Option<Vec<Operation>>,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl ChainConfig {
    pub fn watched_ops(&self) -> Vec<Operation> {
        self.watched_ops.clone().unwrap_or_default()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_channel_capacity() -> usize {
    1000
}

fn default_poll_interval_ms() -> u64 {
    100
}
