//! `x/auth` accounts.
//!
//! Key: `0x01 | address (20 bytes)`. Value: `Any` wrapping a `BaseAccount`
//! or a `ModuleAccount`; other account types are skipped.

use std::collections::BTreeMap;

use prost::Message;

use super::{flush_upserts, hex_address, ADDRESS_LEN};
use crate::models::tables::AUTH;
use crate::models::AuthRow;
use crate::processor::error::ModuleError;
use crate::processor::traits::Module;
use crate::trace::{Operation, TraceOperation};
use crate::types::cosmos::{
    Any, BaseAccount, ModuleAccount, BASE_ACCOUNT_TYPE_URL, MODULE_ACCOUNT_TYPE_URL,
};
use crate::writeback::WritebackOp;

pub const ADDRESS_STORE_PREFIX: u8 = 0x01;

#[derive(Debug, Default)]
pub struct AuthModule {
    cache: BTreeMap<String, AuthRow>,
}

impl AuthModule {
    pub const NAME: &'static str = "auth";

    pub fn new() -> Self {
        Self::default()
    }

    fn base_account(any: Any) -> Result<Option<BaseAccount>, ModuleError> {
        match any.type_url.as_str() {
            BASE_ACCOUNT_TYPE_URL => Ok(Some(BaseAccount::decode(any.value.as_slice())?)),
            MODULE_ACCOUNT_TYPE_URL => {
                let account = ModuleAccount::decode(any.value.as_slice())?;
                account.base_account.map(Some).ok_or_else(|| {
                    ModuleError::InvalidPayload(format!(
                        "module account '{}' has no base account",
                        account.name
                    ))
                })
            }
            _ => Ok(None),
        }
    }
}

impl Module for AuthModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn table_schema(&self) -> String {
        AUTH.create_table()
    }

    fn owns_key(&self, key: &[u8]) -> bool {
        key.len() == 1 + ADDRESS_LEN && key[0] == ADDRESS_STORE_PREFIX
    }

    fn process(&mut self, op: &TraceOperation) -> Result<(), ModuleError> {
        if op.operation != Operation::Write {
            return Ok(());
        }

        let address = hex_address(&op.key, 1)?;
        let any = Any::decode(op.value.as_slice())?;

        let Some(account) = Self::base_account(any.clone())? else {
            tracing::debug!("Skipping account {} of type {}", address, any.type_url);
            return Ok(());
        };

        let row = AuthRow {
            height: op.block_height,
            chain_name: String::new(),
            address: address.clone(),
            sequence_number: account.sequence,
            account_number: account.account_number,
        };
        self.cache.insert(address, row);

        Ok(())
    }

    fn flush_cache(&mut self) -> Vec<WritebackOp> {
        flush_upserts(&mut self.cache, &AUTH)
    }
}
