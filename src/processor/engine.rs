//! Processor that routes trace operations to store modules.
//!
//! Operations arrive in stream order. Each one is handed to every module
//! owning its key. When the block height moves on, every module cache is
//! flushed and the rows of the finished block are published as a single
//! writeback batch before the first operation of the new block is applied.

use tokio::sync::mpsc::{Receiver, Sender};

use super::error::ProcessorError;
use super::registry::{build_registry, ModuleRegistry};
use super::traits::Module;
use crate::trace::TraceOperation;
use crate::writeback::WritebackOp;

/// Per-chain processor. Owns its registry and the block watermark.
pub struct Processor {
    chain_name: String,
    registry: ModuleRegistry,
    /// Height of the block currently being cached. Zero before the first
    /// non-zero height is seen.
    last_height: u64,
}

impl Processor {
    /// Create a processor with the named modules, or the default set when
    /// `enabled` is `None`.
    pub fn new(
        chain_name: impl Into<String>,
        enabled: Option<&[String]>,
    ) -> Result<Self, ProcessorError> {
        Ok(Self::with_registry(chain_name, build_registry(enabled)?))
    }

    pub fn with_registry(chain_name: impl Into<String>, registry: ModuleRegistry) -> Self {
        Self {
            chain_name: chain_name.into(),
            registry,
            last_height: 0,
        }
    }

    #[allow(dead_code)]
    pub fn add_module(&mut self, module: Box<dyn Module>) -> Result<(), ProcessorError> {
        self.registry.register(module)
    }

    /// Table schemas of all registered modules, in registration order.
    pub fn migrations(&self) -> Vec<String> {
        self.registry.migrations()
    }

    pub fn module_names(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    #[cfg(test)]
    pub fn last_height(&self) -> u64 {
        self.last_height
    }

    /// Consume operations until `ops_rx` closes.
    ///
    /// Rows cached for the block in progress when the queue closes are
    /// dropped; the block is replayed from the trace on restart.
    pub async fn run(
        mut self,
        mut ops_rx: Receiver<TraceOperation>,
        writeback_tx: Sender<Vec<WritebackOp>>,
    ) -> Result<(), ProcessorError> {
        tracing::info!(
            "Processor for chain {} started with modules {:?}",
            self.chain_name,
            self.registry.names()
        );

        while let Some(op) = ops_rx.recv().await {
            self.handle(op, &writeback_tx).await?;
        }

        tracing::info!(
            "Trace queue closed, processor for chain {} stopped at height {}",
            self.chain_name,
            self.last_height
        );
        Ok(())
    }

    async fn handle(
        &mut self,
        op: TraceOperation,
        writeback_tx: &Sender<Vec<WritebackOp>>,
    ) -> Result<(), ProcessorError> {
        if op.block_height != 0 && op.block_height != self.last_height {
            let batch = self.flush_all();

            if !batch.is_empty() {
                tracing::debug!(
                    "Publishing {} writeback ops for height {}",
                    batch.len(),
                    self.last_height
                );
                writeback_tx
                    .send(batch)
                    .await
                    .map_err(|_| ProcessorError::WritebackClosed)?;
            }

            if self.last_height != 0 {
                tracing::info!(
                    "Processed block {} on chain {}",
                    self.last_height,
                    self.chain_name
                );
            }

            self.last_height = op.block_height;
        }

        self.dispatch(&op);
        Ok(())
    }

    /// Drain every module in registry order into one aggregate batch.
    fn flush_all(&mut self) -> Vec<WritebackOp> {
        let mut batch = Vec::new();

        for module in self.registry.iter_mut() {
            for op in module.flush_cache() {
                if !op.is_empty() {
                    batch.push(op.with_chain_name(&self.chain_name));
                }
            }
        }

        batch
    }

    fn dispatch(&mut self, op: &TraceOperation) {
        for module in self.registry.iter_mut() {
            if !module.owns_key(&op.key) {
                continue;
            }

            if let Err(e) = module.process(op) {
                tracing::error!(
                    "Module {} failed on {} at height {} for key {}: {}",
                    module.name(),
                    op.operation,
                    op.block_height,
                    hex::encode(&op.key),
                    e
                );
            }
        }
    }
}
