//! Acquisition controller
//!
//! Mediates between the two acquisition modes, file selection and live
//! recording, and normalizes either into a single `VideoArtifact`. The
//! two modes can both hold a completed candidate at once; `finalize`
//! prefers whichever completed last.

use std::path::{Path, PathBuf};

use super::artifact::{mime_for_extension, MediaConstraints, VideoArtifact, VideoSource};
use super::recording::{RecordingSession, RecordingStatus};
use crate::capture::CaptureStream;
use crate::utils::error::{AcquisitionError, AcquisitionResult, MediaRejectReason};
use chrono::Utc;

/// Which acquisition mode produced a completed candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Recording,
}

/// A validated file selection held until finalize
#[derive(Debug, Clone)]
struct SelectedFile {
    path: PathBuf,
    mime_type: String,
    size_bytes: u64,
}

/// Normalizes file selection and live recording into one `VideoArtifact`
pub struct AcquisitionController {
    constraints: MediaConstraints,
    session: RecordingSession,
    stream: Option<Box<dyn CaptureStream>>,
    selected_file: Option<SelectedFile>,

    /// Which candidate completed most recently; finalize prefers it
    last_completed: Option<SourceKind>,
}

impl AcquisitionController {
    pub fn new(constraints: MediaConstraints) -> Self {
        Self {
            constraints,
            session: RecordingSession::new(),
            stream: None,
            selected_file: None,
            last_completed: None,
        }
    }

    /// Attach the live capture device used by `start_recording`
    pub fn attach_stream(&mut self, stream: Box<dyn CaptureStream>) {
        self.stream = Some(stream);
    }

    pub fn session_status(&self) -> RecordingStatus {
        self.session.status()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.session.elapsed_seconds()
    }

    pub fn has_selected_file(&self) -> bool {
        self.selected_file.is_some()
    }

    /// Validate and stage a file selection
    ///
    /// The file must carry a known video extension on the MIME allowlist
    /// and fall within the configured size bounds. Rejections leave the
    /// controller unchanged.
    pub fn select_file(&mut self, path: impl AsRef<Path>) -> AcquisitionResult<()> {
        let path = path.as_ref();

        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_for_extension)
            .ok_or_else(|| AcquisitionError::InvalidMedia {
                reason: MediaRejectReason::Type,
                message: format!("not a recognized video file: {}", path.display()),
            })?;

        if !self.constraints.allowed_types.iter().any(|t| t == mime) {
            tracing::warn!(mime, "File rejected: type not allowed");
            return Err(AcquisitionError::InvalidMedia {
                reason: MediaRejectReason::Type,
                message: format!("{mime} is not an accepted video type"),
            });
        }

        let size_bytes = std::fs::metadata(path)?.len();
        if size_bytes < self.constraints.min_size_bytes {
            tracing::warn!(size_bytes, "File rejected: too small");
            return Err(AcquisitionError::InvalidMedia {
                reason: MediaRejectReason::Size,
                message: format!(
                    "file too small or empty - minimum {} bytes",
                    self.constraints.min_size_bytes
                ),
            });
        }
        if size_bytes > self.constraints.max_size_bytes {
            tracing::warn!(size_bytes, "File rejected: too large");
            return Err(AcquisitionError::InvalidMedia {
                reason: MediaRejectReason::Size,
                message: format!(
                    "file exceeds maximum of {} bytes",
                    self.constraints.max_size_bytes
                ),
            });
        }

        tracing::info!(path = %path.display(), mime, size_bytes, "File selected");
        self.selected_file = Some(SelectedFile {
            path: path.to_path_buf(),
            mime_type: mime.to_string(),
            size_bytes,
        });
        self.last_completed = Some(SourceKind::File);
        Ok(())
    }

    /// Start a live recording take on the attached capture stream
    pub async fn start_recording(&mut self) -> AcquisitionResult<()> {
        if self.session.status() == RecordingStatus::Recording {
            return Err(AcquisitionError::InvalidState(
                "already recording".to_string(),
            ));
        }

        let stream = self.stream.as_mut().ok_or_else(|| {
            AcquisitionError::InvalidState("no capture stream attached".to_string())
        })?;

        let mime = stream.mime_type().to_string();
        let rx = stream.start().await?;
        self.session.start(rx, mime)
    }

    /// Stop the live take
    ///
    /// Stops the capture stream first so its channel closes, then halts
    /// the session's tasks. Once this returns no further chunk can land.
    pub async fn stop_recording(&mut self) -> AcquisitionResult<()> {
        if self.session.status() != RecordingStatus::Recording {
            return Err(AcquisitionError::InvalidState(
                "not recording".to_string(),
            ));
        }

        if let Some(stream) = self.stream.as_mut() {
            stream.stop().await?;
        }
        self.session.stop().await?;

        if self.session.has_chunks() {
            self.last_completed = Some(SourceKind::Recording);
        }
        Ok(())
    }

    /// Discard the completed take
    pub fn retake(&mut self) -> AcquisitionResult<()> {
        self.session.retake()?;
        if self.last_completed == Some(SourceKind::Recording) {
            // A surviving file selection becomes the candidate again
            self.last_completed = self.selected_file.as_ref().map(|_| SourceKind::File);
        }
        Ok(())
    }

    /// Produce the finalized artifact
    ///
    /// Requires a staged file or a stopped take with chunks. When both
    /// candidates exist the most recently completed one wins. Takes no
    /// mutable state, so repeated calls yield identical artifacts until
    /// the controller is mutated again.
    pub fn finalize(&self) -> AcquisitionResult<VideoArtifact> {
        let file_ready = self.selected_file.is_some();
        let take_ready =
            self.session.status() == RecordingStatus::Stopped && self.session.has_chunks();

        let pick = match (file_ready, take_ready) {
            (false, false) => return Err(AcquisitionError::NoMedia),
            (true, false) => SourceKind::File,
            (false, true) => SourceKind::Recording,
            (true, true) => self.last_completed.unwrap_or(SourceKind::File),
        };

        let artifact = match pick {
            SourceKind::File => {
                let file = self
                    .selected_file
                    .as_ref()
                    .ok_or(AcquisitionError::NoMedia)?;
                VideoArtifact {
                    source: VideoSource::File {
                        path: file.path.clone(),
                    },
                    mime_type: file.mime_type.clone(),
                    size_bytes: file.size_bytes,
                    created_at: Utc::now(),
                }
            }
            SourceKind::Recording => {
                let data = self.session.assembled();
                let mime_type = self
                    .session
                    .mime_type()
                    .unwrap_or("video/webm")
                    .to_string();
                VideoArtifact {
                    size_bytes: data.len() as u64,
                    source: VideoSource::Recording { data },
                    mime_type,
                    created_at: Utc::now(),
                }
            }
        };

        tracing::info!(
            mime = %artifact.mime_type,
            size_bytes = artifact.size_bytes,
            "Acquisition finalized"
        );
        Ok(artifact)
    }
}

impl Default for AcquisitionController {
    fn default() -> Self {
        Self::new(MediaConstraints::default())
    }
}
