//! Trace ingestion: decoding the node's store trace and tailing it.

pub mod error;
pub mod operation;
pub mod watcher;

pub use error::WatcherError;
pub use operation::{Operation, TraceOperation};
pub use watcher::TraceWatcher;
