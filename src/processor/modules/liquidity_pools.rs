//! `x/liquidity` pools.
//!
//! Key: `0x11 | pool id (u64 big-endian)`. Value: `Pool`.

use std::collections::BTreeMap;

use prost::Message;

use super::{flush_upserts, read_u64_be};
use crate::models::tables::LIQUIDITY_POOLS;
use crate::models::PoolRow;
use crate::processor::error::ModuleError;
use crate::processor::traits::Module;
use crate::trace::{Operation, TraceOperation};
use crate::types::cosmos::Pool;
use crate::writeback::WritebackOp;

pub const POOL_PREFIX: u8 = 0x11;

#[derive(Debug, Default)]
pub struct LiquidityPoolsModule {
    cache: BTreeMap<u64, PoolRow>,
}

impl LiquidityPoolsModule {
    pub const NAME: &'static str = "liquidity_pools";

    pub fn new() -> Self {
        Self::default()
    }
}

impl Module for LiquidityPoolsModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn table_schema(&self) -> String {
        LIQUIDITY_POOLS.create_table()
    }

    fn owns_key(&self, key: &[u8]) -> bool {
        key.len() == 9 && key[0] == POOL_PREFIX
    }

    fn process(&mut self, op: &TraceOperation) -> Result<(), ModuleError> {
        if op.operation != Operation::Write {
            return Ok(());
        }

        let pool_id = read_u64_be(&op.key, 1)?;
        let pool = Pool::decode(op.value.as_slice())?;
        if pool.id != pool_id {
            return Err(ModuleError::InvalidPayload(format!(
                "pool {} stored under key for pool {}",
                pool.id, pool_id
            )));
        }

        let row = PoolRow {
            height: op.block_height,
            chain_name: String::new(),
            pool_id,
            type_id: pool.type_id,
            reserve_coin_denoms: pool.reserve_coin_denoms,
            reserve_account_address: pool.reserve_account_address,
            pool_coin_denom: pool.pool_coin_denom,
        };
        self.cache.insert(pool_id, row);

        Ok(())
    }

    fn flush_cache(&mut self) -> Vec<WritebackOp> {
        flush_upserts(&mut self.cache, &LIQUIDITY_POOLS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbValue;

    fn pool_op(key_id: u64, pool: &Pool) -> TraceOperation {
        let mut key = vec![POOL_PREFIX];
        key.extend_from_slice(&key_id.to_be_bytes());

        TraceOperation {
            operation: Operation::Write,
            key,
            value: pool.encode_to_vec(),
            block_height: 30,
            tx_hash: None,
            metadata: None,
        }
    }

    fn pool(id: u64) -> Pool {
        Pool {
            id,
            type_id: 1,
            reserve_coin_denoms: vec!["uatom".to_string(), "uosmo".to_string()],
            reserve_account_address: "cosmos1reserve".to_string(),
            pool_coin_denom: "pool96EF".to_string(),
        }
    }

    #[test]
    fn test_pool_row() {
        let mut module = LiquidityPoolsModule::new();
        let op = pool_op(5, &pool(5));
        assert!(module.owns_key(&op.key));

        module.process(&op).unwrap();

        let ops = module.flush_cache();
        let params = ops[0].rows[0].params();
        assert_eq!(params[2], DbValue::Uint64(5));
        assert_eq!(params[3], DbValue::Uint64(1));
        assert_eq!(
            params[4],
            DbValue::TextArray(vec!["uatom".to_string(), "uosmo".to_string()])
        );
        assert_eq!(params[6], DbValue::from("pool96EF"));
    }

    #[test]
    fn test_mismatched_pool_id_is_rejected() {
        let mut module = LiquidityPoolsModule::new();

        let result = module.process(&pool_op(5, &pool(6)));
        assert!(matches!(result, Err(ModuleError::InvalidPayload(_))));
    }
}
