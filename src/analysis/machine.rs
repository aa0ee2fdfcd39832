//! Progress state machine
//!
//! A pure, synchronous walk through the staged run. Each `advance` call
//! applies at most one state change and tells the driver what to do
//! before the next call: sleep, publish a snapshot, dispatch a backend
//! call, or finish. Nothing here touches a clock, which is what makes
//! the walk testable step by step.

use std::time::Duration;

use super::types::{AgentState, AgentStatus, AnalysisStage, StageTiming};

/// Progress value after the upload stage
pub const UPLOAD_CHECKPOINT: u8 = 10;
/// Progress value at which vision completes and coaching begins
pub const VISION_CHECKPOINT: u8 = 60;
/// Progress increment per vision step
pub const VISION_STEP: u8 = 5;
/// Progress increment per coaching step
pub const COACHING_STEP: u8 = 10;

/// What the driver must do before calling `advance` again
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Sleep this long
    Wait(Duration),
    /// Progress or agent status changed; publish a snapshot
    Publish,
    /// Dispatch the vision backend call; vision cannot complete without it
    RunVision,
    /// Dispatch the coaching backend call; its report becomes the result
    RunCoaching,
    /// Terminal: emit the completion event
    Finish,
}

// Cursor over the run: each stage alternates wait/apply, with one-shot
// dispatch points at stage entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    UploadWait,
    UploadApply,
    VisionDispatch,
    VisionWait,
    VisionApply,
    CoachingDispatch,
    CoachingWait,
    CoachingApply,
    SettleWait,
    Finish,
    Terminal,
}

/// Step-driven progress machine for one analysis run
#[derive(Debug, Clone)]
pub struct ProgressMachine {
    timing: StageTiming,
    stage: AnalysisStage,
    progress: u8,
    agents: AgentStatus,
    cursor: Cursor,
}

impl ProgressMachine {
    pub fn new(timing: StageTiming) -> Self {
        Self {
            timing,
            stage: AnalysisStage::Uploading,
            progress: 0,
            agents: AgentStatus::default(),
            cursor: Cursor::UploadWait,
        }
    }

    pub fn stage(&self) -> AnalysisStage {
        self.stage
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn agents(&self) -> AgentStatus {
        self.agents
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.stage, AnalysisStage::Done | AnalysisStage::Failed)
            && self.cursor == Cursor::Terminal
    }

    /// Mark the run failed after a backend error
    ///
    /// Agent statuses are left as they were: a failed call never advances
    /// its agent past `Processing`.
    pub fn fail(&mut self) {
        self.stage = AnalysisStage::Failed;
        self.cursor = Cursor::Terminal;
    }

    /// Apply the next state change and return the driver's next action
    pub fn advance(&mut self) -> Transition {
        match self.cursor {
            Cursor::UploadWait => {
                self.cursor = Cursor::UploadApply;
                Transition::Wait(self.timing.upload)
            }
            Cursor::UploadApply => {
                self.progress = UPLOAD_CHECKPOINT;
                self.stage = AnalysisStage::VisionProcessing;
                self.agents.vision = AgentState::Processing;
                self.cursor = Cursor::VisionDispatch;
                Transition::Publish
            }
            Cursor::VisionDispatch => {
                self.cursor = Cursor::VisionWait;
                Transition::RunVision
            }
            Cursor::VisionWait => {
                self.cursor = Cursor::VisionApply;
                Transition::Wait(self.timing.vision_step)
            }
            Cursor::VisionApply => {
                self.progress = (self.progress + VISION_STEP).min(VISION_CHECKPOINT);
                if self.progress == VISION_CHECKPOINT {
                    self.agents.vision = AgentState::Complete;
                    self.agents.coaching = AgentState::Processing;
                    self.stage = AnalysisStage::Coaching;
                    self.cursor = Cursor::CoachingDispatch;
                } else {
                    self.cursor = Cursor::VisionWait;
                }
                Transition::Publish
            }
            Cursor::CoachingDispatch => {
                self.cursor = Cursor::CoachingWait;
                Transition::RunCoaching
            }
            Cursor::CoachingWait => {
                self.cursor = Cursor::CoachingApply;
                Transition::Wait(self.timing.coaching_step)
            }
            Cursor::CoachingApply => {
                self.progress = (self.progress + COACHING_STEP).min(100);
                if self.progress == 100 {
                    self.agents.coaching = AgentState::Complete;
                    self.stage = AnalysisStage::Done;
                    self.cursor = Cursor::SettleWait;
                } else {
                    self.cursor = Cursor::CoachingWait;
                }
                Transition::Publish
            }
            Cursor::SettleWait => {
                self.cursor = Cursor::Finish;
                Transition::Wait(self.timing.settle)
            }
            Cursor::Finish | Cursor::Terminal => {
                self.cursor = Cursor::Terminal;
                Transition::Finish
            }
        }
    }
}
