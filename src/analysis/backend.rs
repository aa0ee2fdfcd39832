//! Analysis backend seam
//!
//! The pipeline delegates its two agent calls to this trait: pose
//! extraction over the video, then coaching over the vision output.
//! `CannedBackend` is the reference stand-in used by the simulated run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::report::{FormIssue, FormReport, IssueSeverity, MetricReading, MetricStatus};
use crate::acquisition::VideoArtifact;

/// Failure reported by a backend call
#[derive(Error, Debug)]
#[error("{0}")]
pub struct BackendError(pub String);

/// Output of the vision pass, consumed by the coaching pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionOutput {
    /// Frames examined in the video
    pub total_frames: u32,

    /// Opaque pose summary handed to the coaching call
    pub pose_summary: String,
}

/// Inference and coaching delegate
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Run pose extraction over the artifact
    async fn analyze_video(
        &self,
        artifact: &VideoArtifact,
        exercise_label: &str,
    ) -> Result<VisionOutput, BackendError>;

    /// Turn vision output into a coaching report
    async fn coach(
        &self,
        vision: &VisionOutput,
        exercise_label: &str,
    ) -> Result<FormReport, BackendError>;
}

/// Fixed-payload backend matching the reference demo run
pub struct CannedBackend;

#[async_trait]
impl AnalysisBackend for CannedBackend {
    async fn analyze_video(
        &self,
        _artifact: &VideoArtifact,
        exercise_label: &str,
    ) -> Result<VisionOutput, BackendError> {
        Ok(VisionOutput {
            total_frames: 120,
            pose_summary: format!("pose landmarks extracted for {exercise_label}"),
        })
    }

    async fn coach(
        &self,
        _vision: &VisionOutput,
        _exercise_label: &str,
    ) -> Result<FormReport, BackendError> {
        Ok(canned_report())
    }
}

/// The reference result payload
pub fn canned_report() -> FormReport {
    FormReport {
        overall_score: 7.2,
        issues: vec![
            FormIssue {
                issue_type: "Knee Valgus".to_string(),
                severity: IssueSeverity::Moderate,
                frame_start: 23,
                frame_end: 45,
                cue: "Your right knee is collapsing inward 12°. Push both knees out to track \
                      over your toes."
                    .to_string(),
            },
            FormIssue {
                issue_type: "Insufficient Depth".to_string(),
                severity: IssueSeverity::Minor,
                frame_start: 34,
                frame_end: 56,
                cue: "You're stopping 5° above parallel. Sit back like reaching for a chair to \
                      achieve proper depth."
                    .to_string(),
            },
            FormIssue {
                issue_type: "Back Rounding".to_string(),
                severity: IssueSeverity::Moderate,
                frame_start: 78,
                frame_end: 92,
                cue: "Your spine is flexing 15° at the bottom. Keep your chest up and maintain \
                      your natural curve."
                    .to_string(),
            },
        ],
        strengths: vec![
            "Consistent tempo (good control)".to_string(),
            "Balanced left/right symmetry".to_string(),
            "Strong bracing throughout".to_string(),
        ],
        metrics: BTreeMap::from([
            (
                "Knee Angle (bottom)".to_string(),
                MetricReading {
                    actual: "87°".to_string(),
                    target: "90°".to_string(),
                    status: MetricStatus::Warning,
                },
            ),
            (
                "Hip Angle (bottom)".to_string(),
                MetricReading {
                    actual: "92°".to_string(),
                    target: "85-95°".to_string(),
                    status: MetricStatus::Good,
                },
            ),
            (
                "Back Angle".to_string(),
                MetricReading {
                    actual: "18°".to_string(),
                    target: "<15°".to_string(),
                    status: MetricStatus::Warning,
                },
            ),
            (
                "Depth Achieved".to_string(),
                MetricReading {
                    actual: "95%".to_string(),
                    target: "100%".to_string(),
                    status: MetricStatus::Warning,
                },
            ),
            (
                "Symmetry Score".to_string(),
                MetricReading {
                    actual: "9.2/10".to_string(),
                    target: ">8/10".to_string(),
                    status: MetricStatus::Good,
                },
            ),
        ]),
        recommendations: vec![
            "Strengthening glutes (knee stability)".to_string(),
            "Ankle mobility drills".to_string(),
            "Core bracing practice".to_string(),
        ],
    }
}
