//! Capture device seam
//!
//! The acquisition controller records through the `CaptureStream` trait;
//! concrete device implementations live with the host application.

pub mod traits;

pub use traits::CaptureStream;
