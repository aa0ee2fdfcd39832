//! Capture trait definitions
//!
//! Device-agnostic seam for live capture sources. The acquisition layer
//! only consumes start/stop/data hooks; device discovery and permission
//! prompts stay with the host application.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::utils::error::AcquisitionResult;

/// A live capture device that emits encoded media segments.
///
/// `start` hands back the receiving end of a channel; the device pushes
/// encoded chunks into it until `stop` is called. Chunk granularity is
/// device-defined and may be anything from a frame to a whole segment.
#[async_trait]
pub trait CaptureStream: Send + Sync {
    /// MIME type of the segments this stream emits (e.g. "video/webm")
    fn mime_type(&self) -> &str;

    /// Begin emitting chunks
    async fn start(&mut self) -> AcquisitionResult<mpsc::Receiver<Vec<u8>>>;

    /// Stop emitting. The sender side is dropped before this returns,
    /// so the receiver drains whatever is in flight and then closes.
    async fn stop(&mut self) -> AcquisitionResult<()>;
}
