//! Target table definitions and the SQL generated from them.

use crate::writeback::VALUES_MARKER;

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
}

const fn col(name: &'static str, sql_type: &'static str) -> Column {
    Column { name, sql_type }
}

/// A table rows are written back to.
///
/// `columns` is the bound-parameter order of the table's row type;
/// `identity` is the natural key upserts and deletes are matched on.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub identity: &'static [&'static str],
}

impl Table {
    pub fn create_table(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.sql_type))
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} (id serial PRIMARY KEY, {}, UNIQUE ({}))",
            self.name,
            columns.join(", "),
            self.identity.join(", ")
        )
    }

    pub fn upsert(&self) -> String {
        let columns: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        let updates: Vec<String> = columns
            .iter()
            .filter(|c| !self.identity.contains(*c))
            .map(|c| format!("{} = EXCLUDED.{}", c, c))
            .collect();

        let on_conflict = if updates.is_empty() {
            "DO NOTHING".to_string()
        } else {
            format!("DO UPDATE SET {}", updates.join(", "))
        };

        format!(
            "INSERT INTO {} ({}) VALUES {} ON CONFLICT ({}) {}",
            self.name,
            columns.join(", "),
            VALUES_MARKER,
            self.identity.join(", "),
            on_conflict
        )
    }

    pub fn delete(&self) -> String {
        format!(
            "DELETE FROM {} WHERE ({}) IN ({})",
            self.name,
            self.identity.join(", "),
            VALUES_MARKER
        )
    }
}

pub const BALANCES: Table = Table {
    name: "balances",
    columns: &[
        col("height", "BIGINT NOT NULL"),
        col("chain_name", "TEXT NOT NULL"),
        col("address", "TEXT NOT NULL"),
        col("amount", "TEXT NOT NULL"),
        col("denom", "TEXT NOT NULL"),
    ],
    identity: &["chain_name", "address", "denom"],
};

pub const AUTH: Table = Table {
    name: "auth",
    columns: &[
        col("height", "BIGINT NOT NULL"),
        col("chain_name", "TEXT NOT NULL"),
        col("address", "TEXT NOT NULL"),
        col("sequence_number", "BIGINT NOT NULL"),
        col("account_number", "BIGINT NOT NULL"),
    ],
    identity: &["chain_name", "address"],
};

pub const DELEGATIONS: Table = Table {
    name: "delegations",
    columns: &[
        col("height", "BIGINT NOT NULL"),
        col("chain_name", "TEXT NOT NULL"),
        col("delegator_address", "TEXT NOT NULL"),
        col("validator_address", "TEXT NOT NULL"),
        col("amount", "TEXT NOT NULL"),
    ],
    identity: &["chain_name", "delegator_address", "validator_address"],
};

pub const CONNECTIONS: Table = Table {
    name: "connections",
    columns: &[
        col("height", "BIGINT NOT NULL"),
        col("chain_name", "TEXT NOT NULL"),
        col("connection_id", "TEXT NOT NULL"),
        col("client_id", "TEXT NOT NULL"),
        col("state", "TEXT NOT NULL"),
        col("counter_connection_id", "TEXT"),
        col("counter_client_id", "TEXT"),
    ],
    identity: &["chain_name", "connection_id", "client_id"],
};

pub const CHANNELS: Table = Table {
    name: "channels",
    columns: &[
        col("height", "BIGINT NOT NULL"),
        col("chain_name", "TEXT NOT NULL"),
        col("channel_id", "TEXT NOT NULL"),
        col("port", "TEXT NOT NULL"),
        col("state", "TEXT NOT NULL"),
        col("ordering", "TEXT NOT NULL"),
        col("counter_channel_id", "TEXT"),
        col("counter_port_id", "TEXT"),
        col("hops", "TEXT[] NOT NULL"),
    ],
    identity: &["chain_name", "channel_id", "port"],
};

pub const DENOM_TRACES: Table = Table {
    name: "denom_traces",
    columns: &[
        col("height", "BIGINT NOT NULL"),
        col("chain_name", "TEXT NOT NULL"),
        col("hash", "TEXT NOT NULL"),
        col("path", "TEXT NOT NULL"),
        col("base_denom", "TEXT NOT NULL"),
    ],
    identity: &["chain_name", "hash"],
};

pub const LIQUIDITY_POOLS: Table = Table {
    name: "liquidity_pools",
    columns: &[
        col("height", "BIGINT NOT NULL"),
        col("chain_name", "TEXT NOT NULL"),
        col("pool_id", "BIGINT NOT NULL"),
        col("type_id", "BIGINT NOT NULL"),
        col("reserve_coin_denoms", "TEXT[] NOT NULL"),
        col("reserve_account_address", "TEXT NOT NULL"),
        col("pool_coin_denom", "TEXT NOT NULL"),
    ],
    identity: &["chain_name", "pool_id"],
};

pub const LIQUIDITY_SWAPS: Table = Table {
    name: "liquidity_swaps",
    columns: &[
        col("height", "BIGINT NOT NULL"),
        col("chain_name", "TEXT NOT NULL"),
        col("pool_id", "BIGINT NOT NULL"),
        col("msg_index", "BIGINT NOT NULL"),
        col("requester_address", "TEXT NOT NULL"),
        col("offer_coin_denom", "TEXT NOT NULL"),
        col("offer_coin_amount", "TEXT NOT NULL"),
        col("demand_coin_denom", "TEXT NOT NULL"),
        col("exchanged_offer_coin_amount", "TEXT"),
        col("remaining_offer_coin_amount", "TEXT"),
        col("executed", "BOOLEAN NOT NULL"),
        col("succeeded", "BOOLEAN NOT NULL"),
    ],
    identity: &["chain_name", "pool_id", "msg_index"],
};
