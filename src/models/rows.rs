//! Rows derived from store mutations, one type per target table.
//!
//! Every row renders its parameters in the column order of its
//! [`Table`](super::tables::Table).

use crate::db::DbValue;
use crate::writeback::DatabaseRow;

use super::tables::{
    AUTH, BALANCES, CHANNELS, CONNECTIONS, DELEGATIONS, DENOM_TRACES, LIQUIDITY_POOLS,
    LIQUIDITY_SWAPS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRow {
    pub height: u64,
    pub chain_name: String,
    pub address: String,
    pub amount: String,
    pub denom: String,
}

impl DatabaseRow for BalanceRow {
    fn with_chain_name(&mut self, chain_name: &str) {
        self.chain_name = chain_name.to_string();
    }

    fn params(&self) -> Vec<DbValue> {
        vec![
            DbValue::Uint64(self.height),
            DbValue::from(self.chain_name.as_str()),
            DbValue::from(self.address.as_str()),
            DbValue::from(self.amount.as_str()),
            DbValue::from(self.denom.as_str()),
        ]
    }

    fn field_count(&self) -> usize {
        BALANCES.columns.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRow {
    pub height: u64,
    pub chain_name: String,
    pub address: String,
    pub sequence_number: u64,
    pub account_number: u64,
}

impl DatabaseRow for AuthRow {
    fn with_chain_name(&mut self, chain_name: &str) {
        self.chain_name = chain_name.to_string();
    }

    fn params(&self) -> Vec<DbValue> {
        vec![
            DbValue::Uint64(self.height),
            DbValue::from(self.chain_name.as_str()),
            DbValue::from(self.address.as_str()),
            DbValue::Uint64(self.sequence_number),
            DbValue::Uint64(self.account_number),
        ]
    }

    fn field_count(&self) -> usize {
        AUTH.columns.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationRow {
    pub height: u64,
    pub chain_name: String,
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: String,
}

impl DatabaseRow for DelegationRow {
    fn with_chain_name(&mut self, chain_name: &str) {
        self.chain_name = chain_name.to_string();
    }

    fn params(&self) -> Vec<DbValue> {
        vec![
            DbValue::Uint64(self.height),
            DbValue::from(self.chain_name.as_str()),
            DbValue::from(self.delegator_address.as_str()),
            DbValue::from(self.validator_address.as_str()),
            DbValue::from(self.amount.as_str()),
        ]
    }

    fn field_count(&self) -> usize {
        DELEGATIONS.columns.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IbcConnectionRow {
    pub height: u64,
    pub chain_name: String,
    pub connection_id: String,
    pub client_id: String,
    pub state: String,
    pub counter_connection_id: String,
    pub counter_client_id: String,
}

impl DatabaseRow for IbcConnectionRow {
    fn with_chain_name(&mut self, chain_name: &str) {
        self.chain_name = chain_name.to_string();
    }

    fn params(&self) -> Vec<DbValue> {
        vec![
            DbValue::Uint64(self.height),
            DbValue::from(self.chain_name.as_str()),
            DbValue::from(self.connection_id.as_str()),
            DbValue::from(self.client_id.as_str()),
            DbValue::from(self.state.as_str()),
            DbValue::text_or_null(&self.counter_connection_id),
            DbValue::text_or_null(&self.counter_client_id),
        ]
    }

    fn field_count(&self) -> usize {
        CONNECTIONS.columns.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IbcChannelRow {
    pub height: u64,
    pub chain_name: String,
    pub channel_id: String,
    pub port: String,
    pub state: String,
    pub ordering: String,
    pub counter_channel_id: String,
    pub counter_port_id: String,
    pub hops: Vec<String>,
}

impl DatabaseRow for IbcChannelRow {
    fn with_chain_name(&mut self, chain_name: &str) {
        self.chain_name = chain_name.to_string();
    }

    fn params(&self) -> Vec<DbValue> {
        vec![
            DbValue::Uint64(self.height),
            DbValue::from(self.chain_name.as_str()),
            DbValue::from(self.channel_id.as_str()),
            DbValue::from(self.port.as_str()),
            DbValue::from(self.state.as_str()),
            DbValue::from(self.ordering.as_str()),
            DbValue::text_or_null(&self.counter_channel_id),
            DbValue::text_or_null(&self.counter_port_id),
            DbValue::TextArray(self.hops.clone()),
        ]
    }

    fn field_count(&self) -> usize {
        CHANNELS.columns.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenomTraceRow {
    pub height: u64,
    pub chain_name: String,
    pub hash: String,
    pub path: String,
    pub base_denom: String,
}

impl DatabaseRow for DenomTraceRow {
    fn with_chain_name(&mut self, chain_name: &str) {
        self.chain_name = chain_name.to_string();
    }

    fn params(&self) -> Vec<DbValue> {
        vec![
            DbValue::Uint64(self.height),
            DbValue::from(self.chain_name.as_str()),
            DbValue::from(self.hash.as_str()),
            DbValue::from(self.path.as_str()),
            DbValue::from(self.base_denom.as_str()),
        ]
    }

    fn field_count(&self) -> usize {
        DENOM_TRACES.columns.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRow {
    pub height: u64,
    pub chain_name: String,
    pub pool_id: u64,
    pub type_id: u32,
    pub reserve_coin_denoms: Vec<String>,
    pub reserve_account_address: String,
    pub pool_coin_denom: String,
}

impl DatabaseRow for PoolRow {
    fn with_chain_name(&mut self, chain_name: &str) {
        self.chain_name = chain_name.to_string();
    }

    fn params(&self) -> Vec<DbValue> {
        vec![
            DbValue::Uint64(self.height),
            DbValue::from(self.chain_name.as_str()),
            DbValue::Uint64(self.pool_id),
            DbValue::Uint64(u64::from(self.type_id)),
            DbValue::TextArray(self.reserve_coin_denoms.clone()),
            DbValue::from(self.reserve_account_address.as_str()),
            DbValue::from(self.pool_coin_denom.as_str()),
        ]
    }

    fn field_count(&self) -> usize {
        LIQUIDITY_POOLS.columns.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRow {
    pub height: u64,
    pub chain_name: String,
    pub pool_id: u64,
    pub msg_index: u64,
    pub requester_address: String,
    pub offer_coin_denom: String,
    pub offer_coin_amount: String,
    pub demand_coin_denom: String,
    pub exchanged_offer_coin_amount: String,
    pub remaining_offer_coin_amount: String,
    pub executed: bool,
    pub succeeded: bool,
}

impl DatabaseRow for SwapRow {
    fn with_chain_name(&mut self, chain_name: &str) {
        self.chain_name = chain_name.to_string();
    }

    fn params(&self) -> Vec<DbValue> {
        vec![
            DbValue::Uint64(self.height),
            DbValue::from(self.chain_name.as_str()),
            DbValue::Uint64(self.pool_id),
            DbValue::Uint64(self.msg_index),
            DbValue::from(self.requester_address.as_str()),
            DbValue::from(self.offer_coin_denom.as_str()),
            DbValue::from(self.offer_coin_amount.as_str()),
            DbValue::from(self.demand_coin_denom.as_str()),
            DbValue::text_or_null(&self.exchanged_offer_coin_amount),
            DbValue::text_or_null(&self.remaining_offer_coin_amount),
            DbValue::Bool(self.executed),
            DbValue::Bool(self.succeeded),
        ]
    }

    fn field_count(&self) -> usize {
        LIQUIDITY_SWAPS.columns.len()
    }
}

/// Identity of a row scheduled for removal.
///
/// Renders the chain name followed by `key`, matching the table's identity
/// columns. All delete rows of one table carry keys of the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRow {
    pub chain_name: String,
    pub key: Vec<DbValue>,
}

impl DeleteRow {
    pub fn new(key: Vec<DbValue>) -> Self {
        Self {
            chain_name: String::new(),
            key,
        }
    }
}

impl DatabaseRow for DeleteRow {
    fn with_chain_name(&mut self, chain_name: &str) {
        self.chain_name = chain_name.to_string();
    }

    fn params(&self) -> Vec<DbValue> {
        let mut params = Vec::with_capacity(self.field_count());
        params.push(DbValue::from(self.chain_name.as_str()));
        params.extend(self.key.iter().cloned());
        params
    }

    fn field_count(&self) -> usize {
        self.key.len() + 1
    }
}
