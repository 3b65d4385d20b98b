//! Typed store operations decoded from the node's trace output.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::WatcherError;

/// Kind of store access recorded in a trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Write,
    Read,
    Delete,
    IterKey,
    IterValue,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Write,
        Operation::Read,
        Operation::Delete,
        Operation::IterKey,
        Operation::IterValue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Write => "write",
            Operation::Read => "read",
            Operation::Delete => "delete",
            Operation::IterKey => "iterKey",
            Operation::IterValue => "iterValue",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = WatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| WatcherError::UnknownOperation(s.to_string()))
    }
}

/// One decoded trace record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceOperation {
    pub operation: Operation,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    /// 0 when the record carries no height.
    pub block_height: u64,
    pub tx_hash: Option<String>,
    pub metadata: Option<Vec<u8>>,
}

/// Wire shape of a trace line.
#[derive(Debug, Deserialize)]
struct RawTraceOperation {
    operation: String,
    key: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    metadata: Option<RawMetadata>,
    #[serde(default, rename = "blockHeight")]
    block_height: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMetadata {
    Encoded(String),
    Structured(Map<String, Value>),
}

impl TraceOperation {
    /// Decode a single JSON trace line. `line_number` is only used for errors.
    pub fn decode(line: &[u8], line_number: u64) -> Result<Self, WatcherError> {
        let raw: RawTraceOperation =
            serde_json::from_slice(line).map_err(|source| WatcherError::Decode {
                line: line_number,
                source,
            })?;

        let operation: Operation = raw.operation.parse()?;

        let decode_field = |field: &'static str, data: &str| {
            BASE64
                .decode(data)
                .map_err(|source| WatcherError::InvalidBase64 {
                    line: line_number,
                    field,
                    source,
                })
        };

        let key = decode_field("key", &raw.key)?;
        let value = match raw.value.as_deref() {
            Some(v) => decode_field("value", v)?,
            None => Vec::new(),
        };

        let mut block_height = raw.block_height.unwrap_or(0);
        let mut tx_hash = None;

        let metadata = match raw.metadata {
            None => None,
            Some(RawMetadata::Encoded(data)) => Some(decode_field("metadata", &data)?),
            Some(RawMetadata::Structured(map)) => {
                if block_height == 0 {
                    block_height = map.get("blockHeight").and_then(Value::as_u64).unwrap_or(0);
                }
                tx_hash = map
                    .get("txHash")
                    .and_then(Value::as_str)
                    .filter(|h| !h.is_empty())
                    .map(str::to_string);
                Some(Value::Object(map).to_string().into_bytes())
            }
        };

        Ok(Self {
            operation,
            key,
            value,
            block_height,
            tx_hash,
            metadata,
        })
    }
}
