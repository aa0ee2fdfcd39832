//! Shared utilities

pub mod error;

pub use error::{
    AcquisitionError, AcquisitionResult, AnalysisError, AnalysisResult, ErrorResponse,
    MediaRejectReason,
};
