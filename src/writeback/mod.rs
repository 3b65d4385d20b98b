//! Writeback: batching derived rows and handing them to a sink.

pub mod op;
pub mod sink;

pub use op::{DatabaseRow, WritebackOp, VALUES_MARKER};
pub use sink::{run_writeback, LogSink, Sink};
