//! The transport seam and its raw progress events.
//!
//! A transport reports phase-local byte counts only. Turning them into a
//! single displayed percentage is the workflow's job.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use mixtape_models::{AudioFile, GenerationResult, HealthStatus};

use crate::error::ClientResult;

/// Raw progress of one direction of the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEvent {
    /// Request body bytes handed to the connection
    Upload { loaded: u64, total: u64 },
    /// Response body bytes received
    Download { loaded: u64, total: u64 },
}

/// Sending half of a progress channel.
///
/// The channel is unbounded so no event is dropped: the workflow drains it
/// completely before it declares an attempt finished.
#[derive(Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<TransferEvent>,
}

impl ProgressSender {
    /// Send an event. A closed receiver is not an error.
    pub fn send(&self, event: TransferEvent) {
        let _ = self.tx.send(event);
    }

    pub fn upload(&self, loaded: u64, total: u64) {
        self.send(TransferEvent::Upload { loaded, total });
    }

    pub fn download(&self, loaded: u64, total: u64) {
        self.send(TransferEvent::Download { loaded, total });
    }
}

/// Receiving half of a progress channel.
pub struct ProgressReceiver {
    rx: mpsc::UnboundedReceiver<TransferEvent>,
}

impl ProgressReceiver {
    pub async fn recv(&mut self) -> Option<TransferEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<TransferEvent> {
        self.rx.try_recv().ok()
    }
}

/// Create a progress channel pair.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx }, ProgressReceiver { rx })
}

/// A sender whose events go nowhere.
pub fn noop_sender() -> ProgressSender {
    let (tx, _rx) = mpsc::unbounded_channel();
    ProgressSender { tx }
}

/// One generation exchange per `submit`; no retries.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit the files in order and wait for the result.
    ///
    /// Fails with `EmptyFileSet` before any network activity when `files`
    /// is empty.
    async fn submit(
        &self,
        files: Arc<Vec<AudioFile>>,
        progress: ProgressSender,
    ) -> ClientResult<GenerationResult>;

    /// Fetch the artifact at a server-relative path and save it under
    /// `dest_dir`. Returns the saved file's path.
    async fn retrieve(&self, video_path: &str, dest_dir: &Path) -> ClientResult<PathBuf>;

    /// Liveness probe.
    async fn health(&self) -> ClientResult<HealthStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_progress_channel_preserves_order() {
        let (sender, mut receiver) = progress_channel();

        sender.upload(10, 100);
        sender.upload(100, 100);
        sender.download(5, 5);
        drop(sender);

        assert_eq!(
            receiver.recv().await,
            Some(TransferEvent::Upload { loaded: 10, total: 100 })
        );
        assert_eq!(
            receiver.try_recv(),
            Some(TransferEvent::Upload { loaded: 100, total: 100 })
        );
        assert_eq!(
            receiver.recv().await,
            Some(TransferEvent::Download { loaded: 5, total: 5 })
        );
        assert_eq!(receiver.recv().await, None);
    }

    #[test]
    fn test_noop_sender() {
        let sender = noop_sender();
        // Should not panic even though the receiver is dropped
        sender.upload(1, 2);
        sender.download(1, 2);
    }
}
