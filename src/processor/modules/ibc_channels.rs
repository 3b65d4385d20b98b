//! IBC channel ends.
//!
//! Key: `channelEnds/ports/{port}/channels/{channel-id}`. Value: `Channel`.

use std::collections::BTreeMap;

use prost::Message;

use super::flush_upserts;
use crate::models::tables::CHANNELS;
use crate::models::IbcChannelRow;
use crate::processor::error::ModuleError;
use crate::processor::traits::Module;
use crate::trace::{Operation, TraceOperation};
use crate::types::cosmos::Channel;
use crate::writeback::WritebackOp;

const CHANNEL_ENDS_PREFIX: &str = "channelEnds/ports/";
const CHANNELS_SEPARATOR: &str = "/channels/";

#[derive(Debug, Default)]
pub struct IbcChannelsModule {
    /// Keyed by (channel id, port).
    cache: BTreeMap<(String, String), IbcChannelRow>,
}

impl IbcChannelsModule {
    pub const NAME: &'static str = "ibc_channels";

    pub fn new() -> Self {
        Self::default()
    }

    /// Split a channel end key into `(port, channel id)`.
    fn parse_key(key: &[u8]) -> Result<(String, String), ModuleError> {
        let path = std::str::from_utf8(key)
            .map_err(|_| ModuleError::malformed_key(key, "path is not utf-8"))?;

        path.strip_prefix(CHANNEL_ENDS_PREFIX)
            .and_then(|rest| rest.split_once(CHANNELS_SEPARATOR))
            .filter(|(port, channel)| !port.is_empty() && !channel.is_empty())
            .map(|(port, channel)| (port.to_string(), channel.to_string()))
            .ok_or_else(|| ModuleError::malformed_key(key, "not a channel end path"))
    }
}

impl Module for IbcChannelsModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn table_schema(&self) -> String {
        CHANNELS.create_table()
    }

    fn owns_key(&self, key: &[u8]) -> bool {
        key.starts_with(CHANNEL_ENDS_PREFIX.as_bytes())
    }

    fn process(&mut self, op: &TraceOperation) -> Result<(), ModuleError> {
        if op.operation != Operation::Write {
            return Ok(());
        }

        let (port, channel_id) = Self::parse_key(&op.key)?;
        let channel = Channel::decode(op.value.as_slice())?;
        let counterparty = channel.counterparty.clone().unwrap_or_default();

        let row = IbcChannelRow {
            height: op.block_height,
            chain_name: String::new(),
            channel_id: channel_id.clone(),
            port: port.clone(),
            state: channel.state().as_str_name().to_string(),
            ordering: channel.ordering().as_str_name().to_string(),
            counter_channel_id: counterparty.channel_id,
            counter_port_id: counterparty.port_id,
            hops: channel.connection_hops,
        };
        self.cache.insert((channel_id, port), row);

        Ok(())
    }

    fn flush_cache(&mut self) -> Vec<WritebackOp> {
        flush_upserts(&mut self.cache, &CHANNELS)
    }
}
