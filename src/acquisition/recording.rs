//! Recording session state
//!
//! Tracks a live recording take: the Idle/Recording/Stopped state machine,
//! the ordered chunk buffer, and the elapsed-seconds counter. While
//! recording, two tasks run concurrently: a once-per-second tick and a
//! drain loop over the capture stream's chunk channel. Both are owned
//! exclusively by the session and halted deterministically on stop.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::utils::error::{AcquisitionError, AcquisitionResult};

/// Current state of a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    /// No take in progress
    Idle,
    /// Currently recording
    Recording,
    /// Take completed, chunks retained until retake or finalize
    Stopped,
}

impl Default for RecordingStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// A live recording take
///
/// Chunks are append-only while `Recording` and cleared only on explicit
/// `retake`. The elapsed counter resets on every start; a Stopped session
/// restarted without a retake appends to the existing take.
pub struct RecordingSession {
    status: RecordingStatus,

    /// Ordered chunk buffer, written only by the drain task
    chunks: Arc<RwLock<Vec<Vec<u8>>>>,

    /// Seconds spent recording in the current take
    elapsed_seconds: Arc<AtomicU64>,

    /// When the current take started
    started_at: Option<DateTime<Utc>>,

    /// MIME type reported by the capture stream for this take
    mime_type: Option<String>,

    cancel: Option<CancellationToken>,
    tick_task: Option<JoinHandle<()>>,
    chunk_task: Option<JoinHandle<()>>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            status: RecordingStatus::Idle,
            chunks: Arc::new(RwLock::new(Vec::new())),
            elapsed_seconds: Arc::new(AtomicU64::new(0)),
            started_at: None,
            mime_type: None,
            cancel: None,
            tick_task: None,
            chunk_task: None,
        }
    }

    pub fn status(&self) -> RecordingStatus {
        self.status
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds.load(Ordering::SeqCst)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn has_chunks(&self) -> bool {
        !self.chunks.read().is_empty()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.read().len()
    }

    /// MIME type of the current take, if one was started
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Concatenate the take's chunks in emission order
    ///
    /// Does not drain the buffer, so repeated calls yield identical bytes.
    pub fn assembled(&self) -> Vec<u8> {
        let chunks = self.chunks.read();
        let total: usize = chunks.iter().map(|c| c.len()).sum();
        let mut data = Vec::with_capacity(total);
        for chunk in chunks.iter() {
            data.extend_from_slice(chunk);
        }
        data
    }

    /// Start a take, consuming the capture stream's chunk channel
    ///
    /// Resets the elapsed counter but not the chunk buffer; only `retake`
    /// clears chunks. Illegal while already `Recording`.
    pub fn start(
        &mut self,
        mut rx: mpsc::Receiver<Vec<u8>>,
        mime_type: String,
    ) -> AcquisitionResult<()> {
        if self.status == RecordingStatus::Recording {
            return Err(AcquisitionError::InvalidState(
                "already recording".to_string(),
            ));
        }

        self.elapsed_seconds.store(0, Ordering::SeqCst);
        self.started_at = Some(Utc::now());
        self.mime_type = Some(mime_type);

        let cancel = CancellationToken::new();

        let elapsed = Arc::clone(&self.elapsed_seconds);
        let tick_cancel = cancel.clone();
        let tick_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // First tick completes immediately; skip it so the counter
            // increments once per elapsed second.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = tick_cancel.cancelled() => break,
                    _ = interval.tick() => {
                        elapsed.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        });

        // Drains until the stream closes its sender; only non-empty
        // segments are kept.
        let chunks = Arc::clone(&self.chunks);
        let chunk_task = tokio::spawn(async move {
            while let Some(data) = rx.recv().await {
                if !data.is_empty() {
                    chunks.write().push(data);
                }
            }
        });

        self.cancel = Some(cancel);
        self.tick_task = Some(tick_task);
        self.chunk_task = Some(chunk_task);
        self.status = RecordingStatus::Recording;

        tracing::info!("Recording started");
        Ok(())
    }

    /// Stop the current take
    ///
    /// Awaits both the tick and drain tasks before returning, so no chunk
    /// can be appended once this resolves. The caller stops the capture
    /// stream first; the drain task consumes whatever is already in flight
    /// and exits when the channel closes.
    pub async fn stop(&mut self) -> AcquisitionResult<()> {
        if self.status != RecordingStatus::Recording {
            return Err(AcquisitionError::InvalidState(
                "not recording".to_string(),
            ));
        }

        if let Some(task) = self.chunk_task.take() {
            let _ = task.await;
        }
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = self.tick_task.take() {
            let _ = task.await;
        }

        self.status = RecordingStatus::Stopped;
        tracing::info!(
            chunks = self.chunk_count(),
            elapsed = self.elapsed_seconds(),
            "Recording stopped"
        );
        Ok(())
    }

    /// Discard the completed take and return to `Idle`
    ///
    /// Only legal from `Stopped`: a live take must be stopped first, and
    /// an `Idle` session has nothing to retake.
    pub fn retake(&mut self) -> AcquisitionResult<()> {
        if self.status != RecordingStatus::Stopped {
            return Err(AcquisitionError::InvalidState(
                "nothing to retake".to_string(),
            ));
        }

        self.chunks.write().clear();
        self.elapsed_seconds.store(0, Ordering::SeqCst);
        self.started_at = None;
        self.mime_type = None;
        self.status = RecordingStatus::Idle;

        tracing::info!("Take discarded");
        Ok(())
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}
