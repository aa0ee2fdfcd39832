//! Staged analysis
//!
//! Drives a finalized `VideoArtifact` through the upload → vision →
//! coaching pipeline:
//! - `ProgressMachine` for the pure stage/progress walk
//! - `AnalysisPipeline` as the async driver with events and cancellation
//! - `AnalysisBackend` as the inference/coaching seam

pub mod backend;
pub mod machine;
pub mod pipeline;
pub mod report;
pub mod types;

pub use backend::{AnalysisBackend, BackendError, CannedBackend, VisionOutput};
pub use machine::{ProgressMachine, Transition};
pub use pipeline::AnalysisPipeline;
pub use report::{FormIssue, FormReport, IssueSeverity, MetricReading, MetricStatus};
pub use types::{
    AgentState, AgentStatus, AnalysisEvent, AnalysisProgress, AnalysisStage, StageTiming,
};
