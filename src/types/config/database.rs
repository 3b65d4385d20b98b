//! Configuration for the Postgres sink.

use serde::Deserialize;

/// PostgreSQL's upper bound on bound parameters in one statement.
pub const POSTGRES_MAX_PARAMS: usize = 65535;

/// Largest value under [`POSTGRES_MAX_PARAMS`] that every row width from 1
/// to 16 divides, so no table falls back to one row per statement.
pub const DEFAULT_MAX_PARAMS: usize = 65520;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Environment variable holding the PostgreSQL connection string.
    #[serde(default = "default_database_url_env_var")]
    pub database_url_env_var: String,

    /// Bound-parameter limit each writeback statement is split to.
    #[serde(default = "default_max_params")]
    pub max_params: usize,

    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_database_url_env_var() -> String {
    "DATABASE_URL".to_string()
}

fn default_max_params() -> usize {
    DEFAULT_MAX_PARAMS
}

fn default_pool_size() -> usize {
    16
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url_env_var: default_database_url_env_var(),
            max_params: default_max_params(),
            pool_size: default_pool_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tables::{
        AUTH, BALANCES, CHANNELS, CONNECTIONS, DELEGATIONS, DENOM_TRACES, LIQUIDITY_POOLS,
        LIQUIDITY_SWAPS,
    };

    #[test]
    fn test_default_limit_batches_every_table() {
        let limit = DatabaseConfig::default().max_params;
        assert!(limit <= POSTGRES_MAX_PARAMS);

        for table in [
            BALANCES,
            AUTH,
            DELEGATIONS,
            CONNECTIONS,
            CHANNELS,
            DENOM_TRACES,
            LIQUIDITY_POOLS,
            LIQUIDITY_SWAPS,
        ] {
            assert_eq!(limit % table.columns.len(), 0, "{} upserts", table.name);
            assert_eq!(limit % table.identity.len(), 0, "{} deletes", table.name);
        }
    }
}
