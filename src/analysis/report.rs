//! Form report schema
//!
//! The wire contract for analysis results. These types are consumed, not
//! produced, by the orchestrator: a real backend fills them in, the
//! canned backend substitutes fixed values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Issue Types
// =============================================================================

/// How serious a detected form issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Minor,
    Moderate,
    Severe,
}

/// A single detected form issue, localized to a frame range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormIssue {
    /// Issue name, e.g. "Knee Valgus"
    #[serde(rename = "type")]
    pub issue_type: String,

    pub severity: IssueSeverity,

    /// First frame where the issue is visible
    pub frame_start: u32,

    /// Last frame where the issue is visible
    pub frame_end: u32,

    /// Actionable coaching cue for this issue
    pub cue: String,
}

// =============================================================================
// Metric Types
// =============================================================================

/// How a measured value compares to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Good,
    Warning,
    Error,
}

/// One measured metric against its target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricReading {
    /// Measured value, preformatted (e.g. "87°")
    pub actual: String,

    /// Target value or range (e.g. "85-95°")
    pub target: String,

    pub status: MetricStatus,
}

// =============================================================================
// Report
// =============================================================================

/// Complete analysis result for one exercise video
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormReport {
    /// Overall form score out of 10
    pub overall_score: f64,

    /// Detected issues, most relevant first
    pub issues: Vec<FormIssue>,

    /// What the athlete is doing well
    pub strengths: Vec<String>,

    /// Named metrics keyed by display name
    pub metrics: BTreeMap<String, MetricReading>,

    /// Follow-up training recommendations
    pub recommendations: Vec<String>,
}
