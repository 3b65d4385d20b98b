use thiserror::Error;

/// Failures that stop the trace watcher.
///
/// Running out of bytes is not an error; everything here means the stream
/// can no longer be trusted from the current position.
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("IO error reading trace source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed trace record at line {line}: {source}")]
    Decode {
        line: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid base64 in field '{field}' at line {line}: {source}")]
    InvalidBase64 {
        line: u64,
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),
}
