//! `x/staking` delegations.
//!
//! Key: `0x31 | delegator (20 bytes) | validator (20 bytes)`.
//! Value: `Delegation`. A `delete` on the key removes the delegation.

use std::collections::BTreeMap;

use prost::Message;

use super::{flush_entries, format_dec, hex_address, CacheEntry, ADDRESS_LEN};
use crate::db::DbValue;
use crate::models::tables::DELEGATIONS;
use crate::models::DelegationRow;
use crate::processor::error::ModuleError;
use crate::processor::traits::Module;
use crate::trace::{Operation, TraceOperation};
use crate::types::cosmos::Delegation;
use crate::writeback::WritebackOp;

pub const DELEGATION_PREFIX: u8 = 0x31;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct DelegationKey {
    delegator: String,
    validator: String,
}

#[derive(Debug, Default)]
pub struct DelegationsModule {
    cache: BTreeMap<DelegationKey, CacheEntry<DelegationRow>>,
}

impl DelegationsModule {
    pub const NAME: &'static str = "delegations";

    pub fn new() -> Self {
        Self::default()
    }
}

impl Module for DelegationsModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn table_schema(&self) -> String {
        DELEGATIONS.create_table()
    }

    fn owns_key(&self, key: &[u8]) -> bool {
        key.len() == 1 + 2 * ADDRESS_LEN && key[0] == DELEGATION_PREFIX
    }

    fn process(&mut self, op: &TraceOperation) -> Result<(), ModuleError> {
        let key = DelegationKey {
            delegator: hex_address(&op.key, 1)?,
            validator: hex_address(&op.key, 1 + ADDRESS_LEN)?,
        };

        match op.operation {
            Operation::Write => {
                let delegation = Delegation::decode(op.value.as_slice())?;
                let row = DelegationRow {
                    height: op.block_height,
                    chain_name: String::new(),
                    delegator_address: key.delegator.clone(),
                    validator_address: key.validator.clone(),
                    amount: format_dec(&delegation.shares)?,
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
        flush_entries(&mut self.cache, &DELEGATIONS, |key| {
            vec![
                DbValue::from(key.delegator.as_str()),
                DbValue::from(key.validator.as_str()),
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delegation_key(delegator: u8, validator: u8) -> Vec<u8> {
        let mut key = vec![DELEGATION_PREFIX];
        key.extend_from_slice(&[delegator; ADDRESS_LEN]);
        key.extend_from_slice(&[validator; ADDRESS_LEN]);
        key
    }

    fn op(operation: Operation, key: Vec<u8>, shares: &str) -> TraceOperation {
        TraceOperation {
            operation,
            key,
            value: Delegation {
                delegator_address: "cosmos1delegator".to_string(),
                validator_address: "cosmosvaloper1validator".to_string(),
                shares: shares.to_string(),
            }
            .encode_to_vec(),
            block_height: 100,
            tx_hash: None,
            metadata: None,
        }
    }

    #[test]
    fn test_write_then_delete_in_other_identity_yields_two_ops() {
        let mut module = DelegationsModule::new();

        module
            .process(&op(Operation::Write, delegation_key(1, 2), "1000000000000000000"))
            .unwrap();
        module
            .process(&op(Operation::Delete, delegation_key(3, 4), ""))
            .unwrap();

        let ops = module.flush_cache();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].statement, DELEGATIONS.upsert());
        assert_eq!(
            ops[0].rows[0].params()[4],
            DbValue::from("1.000000000000000000")
        );
        assert_eq!(ops[1].statement, DELEGATIONS.delete());
        assert_eq!(ops[1].field_count(), Some(DELEGATIONS.identity.len()));
    }

    #[test]
    fn test_invalid_shares_are_rejected() {
        let mut module = DelegationsModule::new();

        let result = module.process(&op(Operation::Write, delegation_key(1, 2), "1.5"));
        assert!(matches!(result, Err(ModuleError::InvalidPayload(_))));
        assert!(module.flush_cache().is_empty());
    }

    #[test]
    fn test_owns_delegation_keys() {
        let module = DelegationsModule::new();

        assert!(module.owns_key(&delegation_key(1, 2)));
        assert!(!module.owns_key(&[DELEGATION_PREFIX; 17]));
    }
}
