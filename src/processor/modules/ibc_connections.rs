//! IBC connection ends.
//!
//! Key: `connections/{connection-id}`. Value: `ConnectionEnd`.

use std::collections::BTreeMap;

use prost::Message;

use super::flush_upserts;
use crate::models::tables::CONNECTIONS;
use crate::models::IbcConnectionRow;
use crate::processor::error::ModuleError;
use crate::processor::traits::Module;
use crate::trace::{Operation, TraceOperation};
use crate::types::cosmos::ConnectionEnd;
use crate::writeback::WritebackOp;

const CONNECTIONS_PREFIX: &[u8] = b"connections/";

#[derive(Debug, Default)]
pub struct IbcConnectionsModule {
    /// Keyed by (connection id, client id).
    cache: BTreeMap<(String, String), IbcConnectionRow>,
}

impl IbcConnectionsModule {
    pub const NAME: &'static str = "ibc_connections";

    pub fn new() -> Self {
        Self::default()
    }
}

impl Module for IbcConnectionsModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn table_schema(&self) -> String {
        CONNECTIONS.create_table()
    }

    fn owns_key(&self, key: &[u8]) -> bool {
        key.len() > CONNECTIONS_PREFIX.len() && key.starts_with(CONNECTIONS_PREFIX)
    }

    fn process(&mut self, op: &TraceOperation) -> Result<(), ModuleError> {
        if op.operation != Operation::Write {
            return Ok(());
        }

        let suffix = op
            .key
            .strip_prefix(CONNECTIONS_PREFIX)
            .ok_or_else(|| ModuleError::malformed_key(&op.key, "not a connection path"))?;
        let connection_id = std::str::from_utf8(suffix)
            .map_err(|_| ModuleError::malformed_key(&op.key, "connection id is not utf-8"))?
            .to_string();

        let end = ConnectionEnd::decode(op.value.as_slice())?;
        if end.client_id.is_empty() {
            return Err(ModuleError::InvalidPayload(format!(
                "connection {} has no client id",
                connection_id
            )));
        }

        let counterparty = end.counterparty.clone().unwrap_or_default();
        let row = IbcConnectionRow {
            height: op.block_height,
            chain_name: String::new(),
            connection_id: connection_id.clone(),
            client_id: end.client_id.clone(),
            state: end.state().as_str_name().to_string(),
            counter_connection_id: counterparty.connection_id,
            counter_client_id: counterparty.client_id,
        };
        self.cache.insert((connection_id, end.client_id), row);

        Ok(())
    }

    fn flush_cache(&mut self) -> Vec<WritebackOp> {
        flush_upserts(&mut self.cache, &CONNECTIONS)
    }
}
