//! `x/liquidity` swap requests queued in a pool batch.
//!
//! Key: `0x33 | pool id (u64 big-endian) | msg index (u64 big-endian)`.
//! Value: `SwapMsgState`. Batch cleanup deletes are not mirrored, the table
//! keeps the final state of every swap.

use std::collections::BTreeMap;

use prost::Message;

use super::{flush_upserts, read_u64_be};
use crate::models::tables::LIQUIDITY_SWAPS;
use crate::models::SwapRow;
use crate::processor::error::ModuleError;
use crate::processor::traits::Module;
use crate::trace::{Operation, TraceOperation};
use crate::types::cosmos::{Coin, SwapMsgState};
use crate::writeback::WritebackOp;

pub const SWAP_PREFIX: u8 = 0x33;

#[derive(Debug, Default)]
pub struct LiquiditySwapsModule {
    /// Keyed by (pool id, msg index).
    cache: BTreeMap<(u64, u64), SwapRow>,
}

impl LiquiditySwapsModule {
    pub const NAME: &'static str = "liquidity_swaps";

    pub fn new() -> Self {
        Self::default()
    }
}

fn amount_of(coin: Option<Coin>) -> String {
    coin.map(|c| c.amount).unwrap_or_default()
}

impl Module for LiquiditySwapsModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn table_schema(&self) -> String {
        LIQUIDITY_SWAPS.create_table()
    }

    fn owns_key(&self, key: &[u8]) -> bool {
        key.len() == 17 && key[0] == SWAP_PREFIX
    }

    fn process(&mut self, op: &TraceOperation) -> Result<(), ModuleError> {
        if op.operation != Operation::Write {
            return Ok(());
        }

        let pool_id = read_u64_be(&op.key, 1)?;
        let msg_index = read_u64_be(&op.key, 9)?;

        let state = SwapMsgState::decode(op.value.as_slice())?;
        let msg = state.msg.ok_or_else(|| {
            ModuleError::InvalidPayload(format!(
                "swap {} in pool {} has no request message",
                msg_index, pool_id
            ))
        })?;
        let offer = msg.offer_coin.unwrap_or_default();

        let row = SwapRow {
            height: op.block_height,
            chain_name: String::new(),
            pool_id,
            msg_index,
            requester_address: msg.swap_requester_address,
            offer_coin_denom: offer.denom,
            offer_coin_amount: offer.amount,
            demand_coin_denom: msg.demand_coin_denom,
            exchanged_offer_coin_amount: amount_of(state.exchanged_offer_coin),
            remaining_offer_coin_amount: amount_of(state.remaining_offer_coin),
            executed: state.executed,
            succeeded: state.succeeded,
        };
        self.cache.insert((pool_id, msg_index), row);

        Ok(())
    }

    fn flush_cache(&mut self) -> Vec<WritebackOp> {
        flush_upserts(&mut self.cache, &LIQUIDITY_SWAPS)
    }
}
