//! Video acquisition
//!
//! Everything needed to turn a user gesture into a `VideoArtifact`:
//! - file selection with MIME/size validation
//! - live recording sessions (tick counter + chunk drain)
//! - the controller that arbitrates between the two modes

pub mod artifact;
pub mod controller;
pub mod recording;

pub use artifact::{mime_for_extension, MediaConstraints, VideoArtifact, VideoSource};
pub use controller::{AcquisitionController, SourceKind};
pub use recording::{RecordingSession, RecordingStatus};
