//! Analysis types and configuration
//!
//! Stage and agent enums, the progress snapshot published after every
//! change, and the timing configuration for the staged run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use super::report::FormReport;

/// Stages of an analysis run, strictly ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisStage {
    /// Transferring the artifact to the backend
    Uploading,
    /// Pose extraction over the video frames
    VisionProcessing,
    /// Turning vision output into coaching cues
    Coaching,
    /// Terminal: result attached, completion event fired
    Done,
    /// Terminal: a backend call failed, no result
    Failed,
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisStage::Uploading => "uploading",
            AnalysisStage::VisionProcessing => "visionProcessing",
            AnalysisStage::Coaching => "coaching",
            AnalysisStage::Done => "done",
            AnalysisStage::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Lifecycle of a single agent, monotonic once advanced
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Waiting,
    Processing,
    Complete,
}

/// Status of both agents
///
/// Coaching may only enter `Processing` once vision is `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub vision: AgentState,
    pub coaching: AgentState,
}

impl Default for AgentStatus {
    fn default() -> Self {
        Self {
            vision: AgentState::Waiting,
            coaching: AgentState::Waiting,
        }
    }
}

/// Snapshot of a run, published after every progress or status change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisProgress {
    pub run_id: Uuid,
    pub stage: AnalysisStage,
    /// 0-100, monotonically non-decreasing
    pub progress: u8,
    pub agents: AgentStatus,
    pub exercise_label: String,
}

/// Delays between progress increments
///
/// `Default` reproduces the reference pacing; tests substitute
/// near-zero values.
#[derive(Debug, Clone)]
pub struct StageTiming {
    /// One-shot delay before the upload checkpoint
    pub upload: Duration,
    /// Delay between vision-stage increments
    pub vision_step: Duration,
    /// Delay between coaching-stage increments
    pub coaching_step: Duration,
    /// Settle delay after reaching 100, before the completion event
    pub settle: Duration,
}

impl Default for StageTiming {
    fn default() -> Self {
        Self {
            upload: Duration::from_millis(1000),
            vision_step: Duration::from_millis(500),
            coaching_step: Duration::from_millis(800),
            settle: Duration::from_millis(500),
        }
    }
}

impl StageTiming {
    /// Effectively instant pacing, for tests
    pub fn immediate() -> Self {
        Self {
            upload: Duration::ZERO,
            vision_step: Duration::ZERO,
            coaching_step: Duration::ZERO,
            settle: Duration::ZERO,
        }
    }
}

/// Events emitted during an analysis run
#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    /// Progress or agent status changed
    Progress(AnalysisProgress),
    /// Run finished; fired exactly once, only at progress 100
    Completed {
        run_id: Uuid,
        exercise_label: String,
        report: FormReport,
    },
    /// A backend call failed; no completion event follows
    Failed {
        run_id: Uuid,
        exercise_label: String,
        reason: String,
    },
}
