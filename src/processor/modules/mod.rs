//! Store modules indexed by the processor, one per key namespace.
//!
//! Cosmos stores are traced without their store name, so namespaces are
//! told apart by key prefix and key length alone. Where two stores share a
//! prefix (bank balances and IBC denom traces both use `0x02`), both modules
//! receive the key and the one whose payload does not validate reports it.

pub mod auth;
pub mod bank;
pub mod delegations;
pub mod ibc_channels;
pub mod ibc_connections;
pub mod ibc_denom_traces;
pub mod liquidity_pools;
pub mod liquidity_swaps;

use std::collections::BTreeMap;

pub use auth::AuthModule;
pub use bank::BankModule;
pub use delegations::DelegationsModule;
pub use ibc_channels::IbcChannelsModule;
pub use ibc_connections::IbcConnectionsModule;
pub use ibc_denom_traces::IbcDenomTracesModule;
pub use liquidity_pools::LiquidityPoolsModule;
pub use liquidity_swaps::LiquiditySwapsModule;

use crate::db::DbValue;
use crate::models::{DeleteRow, Table};
use crate::writeback::{DatabaseRow, WritebackOp};

use super::error::ModuleError;

/// Length of an account or validator address in store keys.
pub const ADDRESS_LEN: usize = 20;

/// Precision of `sdk.Dec` values.
const DEC_PRECISION: usize = 18;

/// Latest pending change for one identity within the open block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry<R> {
    Upsert(R),
    Delete,
}

/// Drain `cache` into one upsert op and one delete op against `table`.
///
/// `identity` renders a cache key as the table's identity columns, without
/// the leading chain name.
pub(crate) fn flush_entries<K, R>(
    cache: &mut BTreeMap<K, CacheEntry<R>>,
    table: &Table,
    identity: impl Fn(&K) -> Vec<DbValue>,
) -> Vec<WritebackOp>
where
    R: DatabaseRow + 'static,
{
    let mut upserts: Vec<Box<dyn DatabaseRow>> = Vec::new();
    let mut deletes: Vec<Box<dyn DatabaseRow>> = Vec::new();

    for (key, entry) in std::mem::take(cache) {
        match entry {
            CacheEntry::Upsert(row) => upserts.push(Box::new(row)),
            CacheEntry::Delete => deletes.push(Box::new(DeleteRow::new(identity(&key)))),
        }
    }

    let mut ops = Vec::with_capacity(2);
    if !upserts.is_empty() {
        ops.push(WritebackOp::new(table.upsert(), upserts));
    }
    if !deletes.is_empty() {
        ops.push(WritebackOp::new(table.delete(), deletes));
    }
    ops
}

/// Drain an upsert-only cache into a single op against `table`.
pub(crate) fn flush_upserts<K, R>(cache: &mut BTreeMap<K, R>, table: &Table) -> Vec<WritebackOp>
where
    R: DatabaseRow + 'static,
{
    let rows: Vec<Box<dyn DatabaseRow>> = std::mem::take(cache)
        .into_values()
        .map(|row| Box::new(row) as Box<dyn DatabaseRow>)
        .collect();

    if rows.is_empty() {
        Vec::new()
    } else {
        vec![WritebackOp::new(table.upsert(), rows)]
    }
}

/// `key[start..start + ADDRESS_LEN]` as lowercase hex.
pub(crate) fn hex_address(key: &[u8], start: usize) -> Result<String, ModuleError> {
    key.get(start..start + ADDRESS_LEN)
        .map(hex::encode)
        .ok_or_else(|| ModuleError::malformed_key(key, "address out of range"))
}

/// Big-endian `u64` at `key[start..start + 8]`.
pub(crate) fn read_u64_be(key: &[u8], start: usize) -> Result<u64, ModuleError> {
    key.get(start..start + 8)
        .and_then(|b| <[u8; 8]>::try_from(b).ok())
        .map(u64::from_be_bytes)
        .ok_or_else(|| ModuleError::malformed_key(key, "u64 out of range"))
}

/// Whether `amount` is a non-empty unsigned integer string.
pub(crate) fn is_amount(amount: &str) -> bool {
    !amount.is_empty() && amount.bytes().all(|b| b.is_ascii_digit())
}

/// Render a serialized `sdk.Dec` (an integer scaled by 10^18) as a decimal
/// string, e.g. `"1500000000000000000"` → `"1.500000000000000000"`.
pub(crate) fn format_dec(raw: &str) -> Result<String, ModuleError> {
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", raw),
    };

    if !is_amount(digits) {
        return Err(ModuleError::InvalidPayload(format!(
            "invalid decimal '{}'",
            raw
        )));
    }

    let padded = format!("{:0>width$}", digits, width = DEC_PRECISION + 1);
    let (integer, fraction) = padded.split_at(padded.len() - DEC_PRECISION);
    Ok(format!("{}{}.{}", sign, integer, fraction))
}
