//! Video artifact and media constraints
//!
//! A `VideoArtifact` is the normalized output of either acquisition mode:
//! a file the user picked, or a blob assembled from a live recording.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the bytes of a finalized artifact came from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum VideoSource {
    /// A file selected from disk
    File { path: PathBuf },

    /// Chunks from a live recording take, concatenated in emission order
    Recording { data: Vec<u8> },
}

/// A finalized piece of video media ready for analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoArtifact {
    /// Origin of the media bytes
    pub source: VideoSource,

    /// Video MIME type (e.g. "video/mp4")
    pub mime_type: String,

    /// Total size in bytes, always > 0
    pub size_bytes: u64,

    /// When acquisition finalized this artifact
    pub created_at: DateTime<Utc>,
}

/// Accepted-media configuration for file selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaConstraints {
    /// Maximum accepted file size in bytes
    pub max_size_bytes: u64,

    /// Minimum accepted file size in bytes (rejects empty/truncated files)
    pub min_size_bytes: u64,

    /// Accepted video MIME types
    pub allowed_types: Vec<String>,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            max_size_bytes: 100 * 1024 * 1024,
            min_size_bytes: 1024,
            allowed_types: vec![
                "video/mp4".to_string(),
                "video/quicktime".to_string(),
                "video/x-msvideo".to_string(),
                "video/webm".to_string(),
            ],
        }
    }
}

/// Infer a video MIME type from a file extension
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "mp4" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "avi" => Some("video/x-msvideo"),
        "webm" => Some("video/webm"),
        _ => None,
    }
}
