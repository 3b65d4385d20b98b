//! ICS-20 denom traces.
//!
//! Key: `0x02 | sha256("{path}/{base_denom}")`. Value: `DenomTrace`.
//! The prefix is shared with bank balances, so the hash in the key is
//! checked against the payload before anything is cached.

use std::collections::BTreeMap;

use prost::Message;
use sha2::{Digest, Sha256};

use super::flush_upserts;
use crate::models::tables::DENOM_TRACES;
use crate::models::DenomTraceRow;
use crate::processor::error::ModuleError;
use crate::processor::traits::Module;
use crate::trace::{Operation, TraceOperation};
use crate::types::cosmos::DenomTrace;
use crate::writeback::WritebackOp;

pub const DENOM_TRACE_PREFIX: u8 = 0x02;
const HASH_LEN: usize = 32;

#[derive(Debug, Default)]
pub struct IbcDenomTracesModule {
    /// Keyed by the uppercase hex trace hash.
    cache: BTreeMap<String, DenomTraceRow>,
}

impl IbcDenomTracesModule {
    pub const NAME: &'static str = "ibc_denom_traces";

    pub fn new() -> Self {
        Self::default()
    }
}

/// Full trace path the hash is computed over.
fn full_path(trace: &DenomTrace) -> String {
    if trace.path.is_empty() {
        trace.base_denom.clone()
    } else {
        format!("{}/{}", trace.path, trace.base_denom)
    }
}

impl Module for IbcDenomTracesModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn table_schema(&self) -> String {
        DENOM_TRACES.create_table()
    }

    fn owns_key(&self, key: &[u8]) -> bool {
        key.len() == 1 + HASH_LEN && key[0] == DENOM_TRACE_PREFIX
    }

    fn process(&mut self, op: &TraceOperation) -> Result<(), ModuleError> {
        if op.operation != Operation::Write {
            return Ok(());
        }

        let trace = DenomTrace::decode(op.value.as_slice())?;
        if trace.base_denom.is_empty() {
            return Err(ModuleError::InvalidPayload(
                "denom trace has no base denom".to_string(),
            ));
        }

        let digest = Sha256::digest(full_path(&trace).as_bytes());
        if op.key.get(1..) != Some(digest.as_slice()) {
            return Err(ModuleError::InvalidPayload(format!(
                "denom trace '{}' does not hash to key {}",
                full_path(&trace),
                hex::encode(&op.key)
            )));
        }

        let hash = hex::encode_upper(digest);
        let row = DenomTraceRow {
            height: op.block_height,
            chain_name: String::new(),
            hash: hash.clone(),
            path: trace.path,
            base_denom: trace.base_denom,
        };
        self.cache.insert(hash, row);

        Ok(())
    }

    fn flush_cache(&mut self) -> Vec<WritebackOp> {
        flush_upserts(&mut self.cache, &DENOM_TRACES)
    }
}
