//! Writer task: the consumer end of the writeback queue.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::Receiver;

use super::op::WritebackOp;
use crate::db::DbError;

/// Destination for writeback batches.
///
/// One call receives every statement of one published batch, already split
/// to fit the bound-parameter limit, in order.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn write(&self, ops: Vec<WritebackOp>) -> Result<(), DbError>;
}

/// Sink that only reports what would be written. Used by `--dry-run`.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl Sink for LogSink {
    async fn write(&self, ops: Vec<WritebackOp>) -> Result<(), DbError> {
        for op in &ops {
            tracing::info!(rows = op.len(), "{}", op.statement);
        }
        Ok(())
    }
}

/// Drain `rx`, splitting each op to at most `max_params` bound parameters,
/// and hand every batch to `sink`.
///
/// Ends when the processor drops its sender. A sink failure ends the task.
pub async fn run_writeback(
    sink: Arc<dyn Sink>,
    mut rx: Receiver<Vec<WritebackOp>>,
    max_params: usize,
) -> Result<(), DbError> {
    while let Some(batch) = rx.recv().await {
        let rows: usize = batch.iter().map(WritebackOp::len).sum();
        let ops: Vec<WritebackOp> = batch
            .into_iter()
            .flat_map(|op| op.split_statements(max_params))
            .collect();

        tracing::debug!("Writing {} rows in {} statements", rows, ops.len());
        sink.write(ops).await?;
    }

    tracing::info!("Writeback queue closed, writer stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::sync::mpsc;

    use super::*;
    use crate::db::DbValue;
    use crate::writeback::DatabaseRow;

    #[derive(Debug)]
    struct PairRow(u64);

    impl DatabaseRow for PairRow {
        fn with_chain_name(&mut self, _chain_name: &str) {}

        fn params(&self) -> Vec<DbValue> {
            vec![DbValue::Uint64(self.0), DbValue::Bool(true)]
        }

        fn field_count(&self) -> usize {
            2
        }
    }

    /// Records `(statement, row count)` per op, per call.
    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<Vec<(String, usize)>>>,
        fail: bool,
    }

    #[async_trait]
    impl Sink for RecordingSink {
        async fn write(&self, ops: Vec<WritebackOp>) -> Result<(), DbError> {
            if self.fail {
                return Err(DbError::MigrationError("sink down".to_string()));
            }
            self.calls.lock().unwrap().push(
                ops.iter()
                    .map(|op| (op.statement.clone(), op.len()))
                    .collect(),
            );
            Ok(())
        }
    }

    fn op(statement: &str, rows: u64) -> WritebackOp {
        WritebackOp::new(
            statement,
            (0..rows)
                .map(|i| Box::new(PairRow(i)) as Box<dyn DatabaseRow>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_batches_are_split_and_written_in_order() {
        let sink = Arc::new(RecordingSink::default());
        let (tx, rx) = mpsc::channel(4);

        tx.send(vec![op("a {values}", 5), op("b {values}", 1)])
            .await
            .unwrap();
        tx.send(vec![op("c {values}", 2)]).await.unwrap();
        drop(tx);

        run_writeback(sink.clone(), rx, 4).await.unwrap();

        let calls = sink.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                vec![
                    ("a {values}".to_string(), 2),
                    ("a {values}".to_string(), 2),
                    ("a {values}".to_string(), 1),
                    ("b {values}".to_string(), 1),
                ],
                vec![("c {values}".to_string(), 2)],
            ]
        );
    }

    #[tokio::test]
    async fn test_sink_failure_ends_writer() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let (tx, rx) = mpsc::channel(4);
        tx.send(vec![op("a {values}", 1)]).await.unwrap();

        assert!(run_writeback(sink, rx, 4).await.is_err());
    }

    #[tokio::test]
    async fn test_log_sink_accepts_everything() {
        let (tx, rx) = mpsc::channel(1);
        tx.send(vec![op("a {values}", 3)]).await.unwrap();
        drop(tx);

        run_writeback(Arc::new(LogSink), rx, 65535).await.unwrap();
    }
}
