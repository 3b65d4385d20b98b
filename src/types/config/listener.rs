use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::types::config::chain::ChainConfig;
use crate::types::config::database::{DatabaseConfig, POSTGRES_MAX_PARAMS};

pub const CONFIG_PATH_ENV_VAR: &str = "CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

#[derive(Debug, Deserialize)]
pub struct ListenerConfig {
    pub chains: Vec<ChainConfig>,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl ListenerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        Self::from_json(&content)
            .with_context(|| format!("Invalid config file at {}", path.display()))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: ListenerConfig =
            serde_json::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.chains.is_empty(), "No chains configured");

        let mut names = HashSet::new();
        for chain in &self.chains {
            anyhow::ensure!(
                names.insert(chain.name.as_str()),
                "Duplicate chain name '{}'",
                chain.name
            );
            anyhow::ensure!(
                chain.channel_capacity > 0,
                "Chain '{}' has a channel capacity of 0",
                chain.name
            );
        }

        anyhow::ensure!(
            self.database.max_params > 0,
            "database.max_params must be greater than 0"
        );
        anyhow::ensure!(
            self.database.max_params <= POSTGRES_MAX_PARAMS,
            "database.max_params must not exceed {}",
            POSTGRES_MAX_PARAMS
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Operation;

    #[test]
    fn test_defaults() {
        let config = ListenerConfig::from_json(
            r#"{"chains": [{"name": "cosmos-hub", "trace_path": "/tmp/hub.fifo"}]}"#,
        )
        .unwrap();

        let chain = &config.chains[0];
        assert_eq!(chain.processors_enabled, None);
        assert!(chain.watched_ops().is_empty());
        assert_eq!(chain.channel_capacity, 1000);
        assert_eq!(chain.poll_interval_ms, 100);
        assert_eq!(config.database.database_url_env_var, "DATABASE_URL");
        assert_eq!(config.database.max_params, 65520);
        assert_eq!(config.database.pool_size, 16);
    }

    #[test]
    fn test_full_chain_entry() {
        let config = ListenerConfig::from_json(
            r#"{
                "chains": [{
                    "name": "osmosis",
                    "trace_path": "/tmp/osmosis.fifo",
                    "processors_enabled": ["bank", "ibc_channels"],
                    "watched_ops": ["write", "delete"],
                    "channel_capacity": 10,
                    "poll_interval_ms": 5
                }],
                "database": {"max_params": 1000}
            }"#,
        )
        .unwrap();

        let chain = &config.chains[0];
        assert_eq!(
            chain.processors_enabled.as_deref(),
            Some(&["bank".to_string(), "ibc_channels".to_string()][..])
        );
        assert_eq!(chain.watched_ops(), vec![Operation::Write, Operation::Delete]);
        assert_eq!(chain.poll_interval().as_millis(), 5);
        assert_eq!(config.database.max_params, 1000);
        assert_eq!(config.database.pool_size, 16);
    }

    #[test]
    fn test_validation() {
        assert!(ListenerConfig::from_json(r#"{"chains": []}"#).is_err());

        let duplicate = r#"{"chains": [
            {"name": "a", "trace_path": "/tmp/a"},
            {"name": "a", "trace_path": "/tmp/b"}
        ]}"#;
        let err = ListenerConfig::from_json(duplicate).unwrap_err();
        assert!(err.to_string().contains("Duplicate chain name 'a'"));

        let zero_params = r#"{
            "chains": [{"name": "a", "trace_path": "/tmp/a"}],
            "database": {"max_params": 0}
        }"#;
        assert!(ListenerConfig::from_json(zero_params).is_err());

        let over_limit = r#"{
            "chains": [{"name": "a", "trace_path": "/tmp/a"}],
            "database": {"max_params": 65536}
        }"#;
        let err = ListenerConfig::from_json(over_limit).unwrap_err();
        assert!(format!("{:#}", err).contains("must not exceed 65535"));
    }

    #[test]
    fn test_unknown_operation_is_rejected() {
        let config = r#"{"chains": [
            {"name": "a", "trace_path": "/tmp/a", "watched_ops": ["update"]}
        ]}"#;
        assert!(ListenerConfig::from_json(config).is_err());
    }
}
