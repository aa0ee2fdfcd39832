//! Analysis pipeline
//!
//! Async driver for one analysis run. Owns the progress machine, the
//! backend delegate, a broadcast event channel, and a cancellation
//! token. `run` loops over the machine's transitions: sleeping through
//! waits, publishing snapshots, and dispatching the two backend calls.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::backend::{AnalysisBackend, BackendError, VisionOutput};
use super::machine::{ProgressMachine, Transition};
use super::report::FormReport;
use super::types::{AnalysisEvent, AnalysisProgress, AnalysisStage, StageTiming};
use crate::acquisition::VideoArtifact;
use crate::utils::error::{AnalysisError, AnalysisResult};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Drives one VideoArtifact through the staged analysis run
///
/// Consumed by `run`; a later run starts from a fresh pipeline and
/// shares nothing with this one.
pub struct AnalysisPipeline {
    run_id: Uuid,
    artifact: VideoArtifact,
    exercise_label: String,
    machine: ProgressMachine,
    backend: Box<dyn AnalysisBackend>,
    cancel: CancellationToken,
    event_tx: broadcast::Sender<AnalysisEvent>,
}

impl AnalysisPipeline {
    pub fn new(
        artifact: VideoArtifact,
        exercise_label: impl Into<String>,
        backend: Box<dyn AnalysisBackend>,
        timing: StageTiming,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            run_id: Uuid::new_v4(),
            artifact,
            exercise_label: exercise_label.into(),
            machine: ProgressMachine::new(timing),
            backend,
            cancel: CancellationToken::new(),
            event_tx,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Subscribe to progress and terminal events
    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisEvent> {
        self.event_tx.subscribe()
    }

    /// Token for cancelling the run mid-flight
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn snapshot(&self) -> AnalysisProgress {
        AnalysisProgress {
            run_id: self.run_id,
            stage: self.machine.stage(),
            progress: self.machine.progress(),
            agents: self.machine.agents(),
            exercise_label: self.exercise_label.clone(),
        }
    }

    /// Run to a terminal state
    ///
    /// Returns the report on success, `Backend` on a failed delegate
    /// call (after publishing the `Failed` event), or `Cancelled` if the
    /// token fired; a cancelled run publishes no further events.
    pub async fn run(mut self) -> AnalysisResult<FormReport> {
        tracing::info!(
            run_id = %self.run_id,
            exercise = %self.exercise_label,
            size_bytes = self.artifact.size_bytes,
            "Starting analysis run"
        );

        let mut vision: Option<VisionOutput> = None;
        let mut report: Option<FormReport> = None;

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!(run_id = %self.run_id, "Analysis cancelled");
                return Err(AnalysisError::Cancelled);
            }

            match self.machine.advance() {
                Transition::Wait(duration) => {
                    tokio::select! {
                        _ = self.cancel.cancelled() => {
                            tracing::info!(run_id = %self.run_id, "Analysis cancelled");
                            return Err(AnalysisError::Cancelled);
                        }
                        _ = tokio::time::sleep(duration) => {}
                    }
                }
                Transition::Publish => {
                    let snap = self.snapshot();
                    tracing::debug!(
                        progress = snap.progress,
                        stage = %snap.stage,
                        "Analysis progress"
                    );
                    // No subscribers is fine
                    let _ = self.event_tx.send(AnalysisEvent::Progress(snap));
                }
                Transition::RunVision => {
                    match self
                        .backend
                        .analyze_video(&self.artifact, &self.exercise_label)
                        .await
                    {
                        Ok(output) => vision = Some(output),
                        Err(e) => return self.fail(AnalysisStage::VisionProcessing, e),
                    }
                }
                Transition::RunCoaching => {
                    let Some(vision) = vision.as_ref() else {
                        return self.fail(
                            AnalysisStage::Coaching,
                            BackendError("vision output missing".to_string()),
                        );
                    };
                    match self.backend.coach(vision, &self.exercise_label).await {
                        Ok(r) => report = Some(r),
                        Err(e) => return self.fail(AnalysisStage::Coaching, e),
                    }
                }
                Transition::Finish => {
                    let Some(report) = report.take() else {
                        return self.fail(
                            AnalysisStage::Coaching,
                            BackendError("coaching report missing".to_string()),
                        );
                    };
                    tracing::info!(run_id = %self.run_id, "Analysis complete");
                    let _ = self.event_tx.send(AnalysisEvent::Completed {
                        run_id: self.run_id,
                        exercise_label: self.exercise_label.clone(),
                        report: report.clone(),
                    });
                    return Ok(report);
                }
            }
        }
    }

    fn fail(&mut self, stage: AnalysisStage, error: BackendError) -> AnalysisResult<FormReport> {
        self.machine.fail();
        tracing::error!(run_id = %self.run_id, %stage, %error, "Analysis failed");
        let _ = self.event_tx.send(AnalysisEvent::Failed {
            run_id: self.run_id,
            exercise_label: self.exercise_label.clone(),
            reason: error.to_string(),
        });
        Err(AnalysisError::Backend {
            stage,
            message: error.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::VideoSource;
    use crate::analysis::backend::CannedBackend;
    use crate::analysis::types::{AgentState, StageTiming};
    use async_trait::async_trait;
    use chrono::Utc;

    fn artifact() -> VideoArtifact {
        VideoArtifact {
            source: VideoSource::Recording {
                data: vec![0u8; 32],
            },
            mime_type: "video/webm".to_string(),
            size_bytes: 32,
            created_at: Utc::now(),
        }
    }

    fn drain(rx: &mut broadcast::Receiver<AnalysisEvent>) -> Vec<AnalysisEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Backend that fails at a chosen call
    struct FailingBackend {
        fail_vision: bool,
    }

    #[async_trait]
    impl AnalysisBackend for FailingBackend {
        async fn analyze_video(
            &self,
            artifact: &VideoArtifact,
            label: &str,
        ) -> Result<VisionOutput, BackendError> {
            if self.fail_vision {
                return Err(BackendError("pose model unavailable".to_string()));
            }
            CannedBackend.analyze_video(artifact, label).await
        }

        async fn coach(
            &self,
            _vision: &VisionOutput,
            _label: &str,
        ) -> Result<FormReport, BackendError> {
            Err(BackendError("gemini call failed".to_string()))
        }
    }

    #[tokio::test]
    async fn test_full_run_completes_once_at_100() {
        let pipeline = AnalysisPipeline::new(
            artifact(),
            "Squat",
            Box::new(CannedBackend),
            StageTiming::immediate(),
        );
        let mut rx = pipeline.subscribe();

        let report = pipeline.run().await.unwrap();
        assert_eq!(report.overall_score, 7.2);

        let events = drain(&mut rx);
        let mut last_progress = 0;
        let mut completions = 0;
        for event in &events {
            match event {
                AnalysisEvent::Progress(p) => {
                    assert!(p.progress >= last_progress, "progress went backwards");
                    last_progress = p.progress;
                    if p.agents.coaching > AgentState::Waiting {
                        assert_eq!(p.agents.vision, AgentState::Complete);
                    }
                }
                AnalysisEvent::Completed {
                    exercise_label, ..
                } => {
                    assert_eq!(exercise_label, "Squat");
                    assert_eq!(last_progress, 100, "completed before reaching 100");
                    completions += 1;
                }
                AnalysisEvent::Failed { .. } => panic!("unexpected failure event"),
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(last_progress, 100);
    }

    #[tokio::test]
    async fn test_vision_failure_terminates_run() {
        let pipeline = AnalysisPipeline::new(
            artifact(),
            "Squat",
            Box::new(FailingBackend { fail_vision: true }),
            StageTiming::immediate(),
        );
        let mut rx = pipeline.subscribe();

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Backend {
                stage: AnalysisStage::VisionProcessing,
                ..
            }
        ));

        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, AnalysisEvent::Failed { .. })));
        assert!(!events
            .iter()
            .any(|e| matches!(e, AnalysisEvent::Completed { .. })));
    }

    #[tokio::test]
    async fn test_coaching_failure_leaves_agent_processing() {
        let pipeline = AnalysisPipeline::new(
            artifact(),
            "Squat",
            Box::new(FailingBackend { fail_vision: false }),
            StageTiming::immediate(),
        );
        let mut rx = pipeline.subscribe();

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Backend {
                stage: AnalysisStage::Coaching,
                ..
            }
        ));

        let events = drain(&mut rx);
        let last_progress = events.iter().rev().find_map(|e| match e {
            AnalysisEvent::Progress(p) => Some(p.clone()),
            _ => None,
        });
        let last_progress = last_progress.expect("no progress events");
        // The failed agent never advances to Complete
        assert_eq!(last_progress.agents.coaching, AgentState::Processing);
        assert_eq!(last_progress.progress, 60);
        assert!(!events
            .iter()
            .any(|e| matches!(e, AnalysisEvent::Completed { .. })));
    }

    #[tokio::test]
    async fn test_cancellation_emits_nothing_further() {
        let pipeline = AnalysisPipeline::new(
            artifact(),
            "Squat",
            Box::new(CannedBackend),
            StageTiming::default(), // real delays so the cancel lands mid-run
        );
        let mut rx = pipeline.subscribe();
        let cancel = pipeline.cancel_token();

        let handle = tokio::spawn(pipeline.run());
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        cancel.cancel();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(AnalysisError::Cancelled)));

        let events = drain(&mut rx);
        assert!(!events
            .iter()
            .any(|e| matches!(e, AnalysisEvent::Completed { .. })));
        assert!(!events
            .iter()
            .any(|e| matches!(e, AnalysisEvent::Failed { .. })));
    }
}
