//! Processor and module error types.

use thiserror::Error;

/// Failure processing a single trace operation inside one module.
///
/// Never fatal: the processor logs it and moves on.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("Protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Malformed key: {0}")]
    MalformedKey(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl ModuleError {
    pub fn malformed_key(key: &[u8], reason: &str) -> Self {
        Self::MalformedKey(format!("{} ({})", hex::encode(key), reason))
    }
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Unknown module '{0}'")]
    UnknownModule(String),

    #[error("Cannot add module '{0}' more than one time")]
    DuplicateModule(String),

    #[error("Writeback queue closed")]
    WritebackClosed,
}
