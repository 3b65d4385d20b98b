//! The contract every indexed store module implements.

use crate::trace::TraceOperation;
use crate::writeback::WritebackOp;

use super::error::ModuleError;

/// A unit owning one logical key namespace of the node's store.
///
/// Each module keeps its own cache of pending rows, keyed by the module's
/// identity scheme. Within one block the latest change for an identity wins,
/// which also makes replaying a block harmless.
pub trait Module: Send + 'static {
    /// Unique name, used in configuration and logging.
    fn name(&self) -> &'static str;

    /// `CREATE TABLE IF NOT EXISTS` statement for the module's table.
    fn table_schema(&self) -> String;

    /// Whether `key` falls within this module's namespace. Must be pure.
    fn owns_key(&self, key: &[u8]) -> bool;

    /// Decode `op` and update the cache.
    ///
    /// On error the cache is left untouched.
    fn process(&mut self, op: &TraceOperation) -> Result<(), ModuleError>;

    /// Drain the cache into writeback operations, leaving it empty.
    ///
    /// Returns no operations when nothing is cached, and never returns an
    /// operation without rows.
    fn flush_cache(&mut self) -> Vec<WritebackOp>;
}
