//! Tails the node's trace file and publishes decoded operations.

use std::path::PathBuf;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::Sender;

use super::error::WatcherError;
use super::operation::{Operation, TraceOperation};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Follows a growing trace file and forwards watched operations.
///
/// Results leave the watcher only through its two queues: decoded records on
/// `data_tx`, and at most one fatal [`WatcherError`] on `error_tx`, after
/// which the watch loop ends.
pub struct TraceWatcher {
    pub data_source_path: PathBuf,
    /// Operations to forward. Empty forwards everything.
    pub watched_ops: Vec<Operation>,
    pub data_tx: Sender<TraceOperation>,
    pub error_tx: Sender<WatcherError>,
    pub poll_interval: Duration,
}

impl TraceWatcher {
    pub fn new(
        data_source_path: impl Into<PathBuf>,
        watched_ops: Vec<Operation>,
        data_tx: Sender<TraceOperation>,
        error_tx: Sender<WatcherError>,
    ) -> Self {
        Self {
            data_source_path: data_source_path.into(),
            watched_ops,
            data_tx,
            error_tx,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run until the trace file is removed, the data queue closes, or the
    /// stream breaks.
    pub async fn watch(self) {
        match self.tail().await {
            Ok(()) => {
                tracing::info!(
                    "Trace watcher for {} stopped",
                    self.data_source_path.display()
                );
            }
            Err(e) => {
                tracing::error!(
                    "Trace watcher for {} failed: {}",
                    self.data_source_path.display(),
                    e
                );
                if self.error_tx.send(e).await.is_err() {
                    tracing::warn!("Trace watcher error queue closed, error dropped");
                }
            }
        }
    }

    fn is_watched(&self, operation: Operation) -> bool {
        self.watched_ops.is_empty() || self.watched_ops.contains(&operation)
    }

    /// Open the trace file, waiting for it to be created if needed.
    async fn open(&self) -> Result<Option<File>, WatcherError> {
        let mut announced = false;

        loop {
            match File::open(&self.data_source_path).await {
                Ok(file) => {
                    tracing::info!("Watching trace file {}", self.data_source_path.display());
                    return Ok(Some(file));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    if !announced {
                        tracing::info!(
                            "Trace file {} does not exist yet, waiting",
                            self.data_source_path.display()
                        );
                        announced = true;
                    }
                    if self.data_tx.is_closed() {
                        return Ok(None);
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn tail(&self) -> Result<(), WatcherError> {
        let Some(file) = self.open().await? else {
            return Ok(());
        };

        let mut reader = BufReader::new(file);
        let mut line: Vec<u8> = Vec::with_capacity(4096);
        let mut line_number: u64 = 0;

        loop {
            reader.read_until(b'\n', &mut line).await?;

            if line.last() != Some(&b'\n') {
                // Caught up with the writer. A partial line stays buffered
                // until the rest of it is appended.
                if self.data_tx.is_closed() {
                    return Ok(());
                }
                if !tokio::fs::try_exists(&self.data_source_path).await? {
                    tracing::info!(
                        "Trace file {} was removed",
                        self.data_source_path.display()
                    );
                    return Ok(());
                }
                tokio::time::sleep(self.poll_interval).await;
                continue;
            }

            line_number += 1;
            let record = line.trim_ascii();
            if record.is_empty() {
                line.clear();
                continue;
            }

            let operation = TraceOperation::decode(record, line_number)?;
            line.clear();

            if !self.is_watched(operation.operation) {
                continue;
            }

            if self.data_tx.send(operation).await.is_err() {
                tracing::debug!("Operation queue closed, stopping trace watcher");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;

    use tokio::sync::mpsc::{self, Receiver};
    use tokio::time::timeout;

    use super::*;

    const WRITE_LINE: &str = r#"{"operation":"write","key":"aWJjL2Z3ZC8weGMwMDA0ZThkMzg=","value":"cG9ydHMvdHJhbnNmZXI=","metadata":null}"#;
    const WAIT: Duration = Duration::from_secs(2);
    const NEVER: Duration = Duration::from_millis(300);

    fn spawn_watcher(
        path: &Path,
        watched_ops: Vec<Operation>,
    ) -> (Receiver<TraceOperation>, Receiver<WatcherError>) {
        let (data_tx, data_rx) = mpsc::channel(16);
        let (error_tx, error_rx) = mpsc::channel(1);

        let watcher = TraceWatcher::new(path, watched_ops, data_tx, error_tx)
            .with_poll_interval(Duration::from_millis(10));
        tokio::spawn(watcher.watch());

        (data_rx, error_rx)
    }

    fn append(path: &Path, data: &str) {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .unwrap();
        file.write_all(data.as_bytes()).unwrap();
        file.flush().unwrap();
    }

    #[tokio::test]
    async fn test_watched_write_is_published() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let (mut data_rx, _error_rx) = spawn_watcher(file.path(), vec![Operation::Write]);

        append(file.path(), &format!("{}\n", WRITE_LINE));

        let op = timeout(WAIT, data_rx.recv()).await.unwrap().unwrap();
        assert_eq!(op.operation, Operation::Write);
        assert_eq!(op.key, b"ibc/fwd/0xc0004e8d38");
        assert!(timeout(NEVER, data_rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_unwatched_operation_is_not_published() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let (mut data_rx, _error_rx) = spawn_watcher(file.path(), vec![Operation::Read]);

        append(file.path(), &format!("{}\n", WRITE_LINE));

        assert!(timeout(NEVER, data_rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_watch_list_publishes_everything() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let (mut data_rx, _error_rx) = spawn_watcher(file.path(), vec![]);

        append(
            file.path(),
            &format!(
                "{}\n{}\n",
                WRITE_LINE,
                r#"{"operation":"read","key":"AQ==","value":"","metadata":null}"#
            ),
        );

        let first = timeout(WAIT, data_rx.recv()).await.unwrap().unwrap();
        let second = timeout(WAIT, data_rx.recv()).await.unwrap().unwrap();
        assert_eq!(first.operation, Operation::Write);
        assert_eq!(second.operation, Operation::Read);
    }

    #[tokio::test]
    async fn test_end_of_stream_is_not_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let (mut data_rx, mut error_rx) = spawn_watcher(file.path(), vec![]);

        append(file.path(), "");
        tokio::time::sleep(Duration::from_millis(50)).await;
        append(file.path(), &format!("{}\n", WRITE_LINE));

        assert!(timeout(WAIT, data_rx.recv()).await.unwrap().is_some());
        assert!(timeout(NEVER, data_rx.recv()).await.is_err());
        assert!(error_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_partial_line_waits_for_newline() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let (mut data_rx, _error_rx) = spawn_watcher(file.path(), vec![]);

        let (head, tail) = WRITE_LINE.split_at(30);
        append(file.path(), head);
        assert!(timeout(NEVER, data_rx.recv()).await.is_err());

        append(file.path(), &format!("{}\n", tail));
        let op = timeout(WAIT, data_rx.recv()).await.unwrap().unwrap();
        assert_eq!(op.value, b"ports/transfer");
    }

    #[tokio::test]
    async fn test_waits_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.log");
        let (mut data_rx, _error_rx) = spawn_watcher(&path, vec![]);

        tokio::time::sleep(Duration::from_millis(50)).await;
        append(&path, &format!("{}\n", WRITE_LINE));

        assert!(timeout(WAIT, data_rx.recv()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_malformed_record_stops_watcher_with_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let (mut data_rx, mut error_rx) = spawn_watcher(file.path(), vec![]);

        append(file.path(), "{\"operation\":\"write\",\n");
        append(file.path(), &format!("{}\n", WRITE_LINE));

        let err = timeout(WAIT, error_rx.recv()).await.unwrap().unwrap();
        assert!(matches!(err, WatcherError::Decode { line: 1, .. }));

        // The watcher is gone: the queue closes without yielding the later record.
        assert!(timeout(WAIT, data_rx.recv()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_removed_file_stops_watcher() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        let (mut data_rx, mut error_rx) = spawn_watcher(&path, vec![]);

        tokio::time::sleep(Duration::from_millis(50)).await;
        file.close().unwrap();

        assert!(timeout(WAIT, data_rx.recv()).await.unwrap().is_none());
        assert!(error_rx.try_recv().is_err());
    }
}
