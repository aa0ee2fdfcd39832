//! Error types and handling
//!
//! Typed errors for the acquisition and analysis layers, plus the
//! `ErrorResponse` mapping used at the application boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::analysis::AnalysisStage;

/// Why a user-supplied file was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaRejectReason {
    /// Not an accepted video MIME type
    Type,
    /// Over the maximum or under the minimum size threshold
    Size,
}

impl fmt::Display for MediaRejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaRejectReason::Type => write!(f, "type"),
            MediaRejectReason::Size => write!(f, "size"),
        }
    }
}

/// Errors raised by the acquisition layer
///
/// All of these are locally recoverable: the controller's state is left
/// unchanged and the caller may retry.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("invalid media ({reason}): {message}")]
    InvalidMedia {
        reason: MediaRejectReason,
        message: String,
    },

    #[error("invalid session state: {0}")]
    InvalidState(String),

    #[error("no media available to finalize")]
    NoMedia,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the analysis layer
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("backend failed during {stage}: {message}")]
    Backend {
        stage: AnalysisStage,
        message: String,
    },

    #[error("analysis cancelled")]
    Cancelled,
}

/// Error response for the application boundary
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<AcquisitionError> for ErrorResponse {
    fn from(error: AcquisitionError) -> Self {
        let code = match &error {
            AcquisitionError::InvalidMedia { .. } => "INVALID_MEDIA",
            AcquisitionError::InvalidState(_) => "INVALID_STATE",
            AcquisitionError::NoMedia => "NO_MEDIA",
            AcquisitionError::Io(_) => "IO_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

impl From<AnalysisError> for ErrorResponse {
    fn from(error: AnalysisError) -> Self {
        let code = match &error {
            AnalysisError::Backend { .. } => "BACKEND_FAILURE",
            AnalysisError::Cancelled => "CANCELLED",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias for acquisition operations
pub type AcquisitionResult<T> = Result<T, AcquisitionError>;

/// Result type alias for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;
