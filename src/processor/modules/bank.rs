//! `x/bank` balances.
//!
//! Key: `0x02 | address (20 bytes) | denom`. Value: `Coin`.
//!
//! ICS-20 denom traces live under the same prefix as `0x02 | sha256`, so a
//! key is only claimed when its tail is a well-formed denom.

use std::collections::BTreeMap;

use prost::Message;

use super::{flush_entries, hex_address, is_amount, CacheEntry, ADDRESS_LEN};
use crate::db::DbValue;
use crate::models::tables::BALANCES;
use crate::models::BalanceRow;
use crate::processor::error::ModuleError;
use crate::processor::traits::Module;
use crate::trace::{Operation, TraceOperation};
use crate::types::cosmos::Coin;
use crate::writeback::WritebackOp;

pub const BALANCES_PREFIX: u8 = 0x02;

const DENOM_MIN_LEN: usize = 3;
const DENOM_MAX_LEN: usize = 128;

/// Cosmos SDK denom grammar: `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
fn is_denom(bytes: &[u8]) -> bool {
    match bytes.split_first() {
        Some((first, rest)) => {
            (DENOM_MIN_LEN..=DENOM_MAX_LEN).contains(&bytes.len())
                && first.is_ascii_alphabetic()
                && rest
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || b"/:._-".contains(b))
        }
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct BalanceKey {
    address: String,
    denom: String,
}

#[derive(Debug, Default)]
pub struct BankModule {
    cache: BTreeMap<BalanceKey, CacheEntry<BalanceRow>>,
}

impl BankModule {
    pub const NAME: &'static str = "bank";

    pub fn new() -> Self {
        Self::default()
    }

    fn parse_key(key: &[u8]) -> Result<BalanceKey, ModuleError> {
        let address = hex_address(key, 1)?;
        let denom = key
            .get(1 + ADDRESS_LEN..)
            .filter(|denom| is_denom(denom))
            .and_then(|denom| std::str::from_utf8(denom).ok())
            .ok_or_else(|| ModuleError::malformed_key(key, "denom is malformed"))?;

        Ok(BalanceKey {
            address,
            denom: denom.to_string(),
        })
    }
}

impl Module for BankModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn table_schema(&self) -> String {
        BALANCES.create_table()
    }

    fn owns_key(&self, key: &[u8]) -> bool {
        key.first() == Some(&BALANCES_PREFIX)
            && key.get(1 + ADDRESS_LEN..).is_some_and(is_denom)
    }

    fn process(&mut self, op: &TraceOperation) -> Result<(), ModuleError> {
        let key = Self::parse_key(&op.key)?;

        match op.operation {
            Operation::Write => {
                let coin = Coin::decode(op.value.as_slice())?;

                if coin.denom != key.denom {
                    return Err(ModuleError::InvalidPayload(format!(
                        "coin denom '{}' does not match key denom '{}'",
                        coin.denom, key.denom
                    )));
                }
                if !is_amount(&coin.amount) {
                    return Err(ModuleError::InvalidPayload(format!(
                        "invalid coin amount '{}'",
                        coin.amount
                    )));
                }

                let row = BalanceRow {
                    height: op.block_height,
                    chain_name: String::new(),
                    address: key.address.clone(),
                    amount: coin.amount,
                    denom: coin.denom,
                };
                self.cache.insert(key, CacheEntry::Upsert(row));
            }
            Operation::Delete => {
                self.cache.insert(key, CacheEntry::Delete);
            }
            _ => {}
        }

        Ok(())
    }

    fn flush_cache(&mut self) -> Vec<WritebackOp> {
        flush_entries(&mut self.cache, &BALANCES, |key| {
            vec![
                DbValue::from(key.address.as_str()),
                DbValue::from(key.denom.as_str()),
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};

    fn balance_key(address: u8, denom: &str) -> Vec<u8> {
        let mut key = vec![BALANCES_PREFIX];
        key.extend_from_slice(&[address; ADDRESS_LEN]);
        key.extend_from_slice(denom.as_bytes());
        key
    }

    fn write(key: Vec<u8>, amount: &str, denom: &str, height: u64) -> TraceOperation {
        TraceOperation {
            operation: Operation::Write,
            key,
            value: Coin {
                denom: denom.to_string(),
                amount: amount.to_string(),
            }
            .encode_to_vec(),
            block_height: height,
            tx_hash: None,
            metadata: None,
        }
    }

    #[test]
    fn test_owns_balance_keys_only() {
        let module = BankModule::new();

        assert!(module.owns_key(&balance_key(1, "uatom")));
        assert!(!module.owns_key(&[BALANCES_PREFIX; 21]));
        assert!(!module.owns_key(b"connections/connection-0"));
    }

    #[test]
    fn test_denom_trace_keys_are_not_balances() {
        let module = BankModule::new();

        let mut key = vec![BALANCES_PREFIX];
        key.extend_from_slice(&Sha256::digest(b"transfer/channel-0/uatom"));
        assert!(!module.owns_key(&key));

        let ibc = "ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2";
        assert!(module.owns_key(&balance_key(1, ibc)));
        assert!(module.owns_key(&balance_key(1, "gravity0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599")));
        assert!(!module.owns_key(&balance_key(1, "ua")));
        assert!(!module.owns_key(&balance_key(1, "1atom")));
        assert!(!module.owns_key(&balance_key(1, &"a".repeat(129))));
        assert!(module.owns_key(&balance_key(1, &"a".repeat(128))));
    }

    #[test]
    fn test_same_identity_collapses_to_latest_value() {
        let mut module = BankModule::new();

        module
            .process(&write(balance_key(1, "uatom"), "100", "uatom", 5))
            .unwrap();
        module
            .process(&write(balance_key(1, "uatom"), "250", "uatom", 5))
            .unwrap();

        assert_eq!(module.cache.len(), 1);
        let ops = module.flush_cache();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].len(), 1);
        assert_eq!(ops[0].rows[0].params()[3], DbValue::from("250"));
        assert!(module.cache.is_empty());
    }

    #[test]
    fn test_distinct_identities_are_kept_apart() {
        let mut module = BankModule::new();

        module
            .process(&write(balance_key(1, "uatom"), "1", "uatom", 5))
            .unwrap();
        module
            .process(&write(balance_key(1, "uosmo"), "2", "uosmo", 5))
            .unwrap();
        module
            .process(&write(balance_key(2, "uatom"), "3", "uatom", 5))
            .unwrap();

        let ops = module.flush_cache();
        assert_eq!(ops[0].len(), 3);
    }

    #[test]
    fn test_delete_replaces_pending_write() {
        let mut module = BankModule::new();
        let key = balance_key(1, "uatom");

        module.process(&write(key.clone(), "100", "uatom", 5)).unwrap();
        module
            .process(&TraceOperation {
                operation: Operation::Delete,
                key,
                value: Vec::new(),
                block_height: 5,
                tx_hash: None,
                metadata: None,
            })
            .unwrap();

        let ops = module.flush_cache();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].statement, BALANCES.delete());
        assert_eq!(ops[0].field_count(), Some(BALANCES.identity.len()));
    }

    #[test]
    fn test_invalid_payload_leaves_cache_untouched() {
        let mut module = BankModule::new();

        let mut bad = write(balance_key(1, "uatom"), "100", "uatom", 5);
        bad.value = vec![0xff, 0xff, 0xff];
        assert!(module.process(&bad).is_err());

        let mismatched = write(balance_key(1, "uatom"), "100", "uosmo", 5);
        assert!(matches!(
            module.process(&mismatched),
            Err(ModuleError::InvalidPayload(_))
        ));

        assert!(module.cache.is_empty());
        assert!(module.flush_cache().is_empty());
    }

    #[test]
    fn test_reads_are_ignored() {
        let mut module = BankModule::new();
        let mut read = write(balance_key(1, "uatom"), "100", "uatom", 5);
        read.operation = Operation::Read;

        module.process(&read).unwrap();
        assert!(module.flush_cache().is_empty());
    }
}
