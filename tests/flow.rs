//! End-to-end flow tests: acquisition through analysis.
//!
//! Exercises the public API the way a screen-flow caller would: acquire
//! a `VideoArtifact` (file or recording), hand it to an
//! `AnalysisPipeline`, and consume the event stream.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use biome_coach::acquisition::{AcquisitionController, MediaConstraints, VideoSource};
use biome_coach::analysis::{
    AgentState, AnalysisBackend, AnalysisEvent, AnalysisPipeline, BackendError, CannedBackend,
    FormReport, StageTiming, VisionOutput,
};
use biome_coach::capture::CaptureStream;
use biome_coach::utils::error::AcquisitionResult;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Capture stream scripted by the test
#[derive(Clone)]
struct ScriptedStream {
    tx: Arc<Mutex<Option<mpsc::Sender<Vec<u8>>>>>,
}

impl ScriptedStream {
    fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    async fn emit(&self, data: Vec<u8>) {
        let tx = self.tx.lock().clone().expect("stream not started");
        tx.send(data).await.unwrap();
    }
}

#[async_trait]
impl CaptureStream for ScriptedStream {
    fn mime_type(&self) -> &str {
        "video/webm"
    }

    async fn start(&mut self) -> AcquisitionResult<mpsc::Receiver<Vec<u8>>> {
        let (tx, rx) = mpsc::channel(16);
        *self.tx.lock() = Some(tx);
        Ok(rx)
    }

    async fn stop(&mut self) -> AcquisitionResult<()> {
        self.tx.lock().take();
        Ok(())
    }
}

/// Backend whose coaching call fails
struct BrokenCoach;

#[async_trait]
impl AnalysisBackend for BrokenCoach {
    async fn analyze_video(
        &self,
        artifact: &biome_coach::acquisition::VideoArtifact,
        label: &str,
    ) -> Result<VisionOutput, BackendError> {
        CannedBackend.analyze_video(artifact, label).await
    }

    async fn coach(
        &self,
        _vision: &VisionOutput,
        _label: &str,
    ) -> Result<FormReport, BackendError> {
        Err(BackendError("coaching service unreachable".to_string()))
    }
}

fn write_video(dir: &tempfile::TempDir, name: &str, len: usize) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(&vec![0u8; len]).unwrap();
    path
}

fn fast_timing() -> StageTiming {
    StageTiming {
        upload: Duration::from_millis(1),
        vision_step: Duration::from_millis(1),
        coaching_step: Duration::from_millis(1),
        settle: Duration::from_millis(1),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn file_selection_through_full_analysis() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_video(&dir, "squat.mp4", 5_000_000);

    let mut controller = AcquisitionController::new(MediaConstraints::default());
    controller.select_file(&path)?;
    let artifact = controller.finalize()?;
    assert_eq!(artifact.size_bytes, 5_000_000);
    assert_eq!(artifact.mime_type, "video/mp4");

    let pipeline =
        AnalysisPipeline::new(artifact, "Squat", Box::new(CannedBackend), fast_timing());
    let mut rx = pipeline.subscribe();

    let report = pipeline.run().await?;
    assert_eq!(report.overall_score, 7.2);
    assert_eq!(report.issues.len(), 3);
    assert_eq!(report.metrics.len(), 5);

    // Progress is monotonic and the coaching agent never runs ahead of
    // vision; exactly one completion, at 100.
    let mut last = 0;
    let mut completions = 0;
    while let Ok(event) = rx.try_recv() {
        match event {
            AnalysisEvent::Progress(p) => {
                assert!(p.progress >= last);
                last = p.progress;
                if p.agents.coaching != AgentState::Waiting {
                    assert_eq!(p.agents.vision, AgentState::Complete);
                }
            }
            AnalysisEvent::Completed { exercise_label, .. } => {
                assert_eq!(exercise_label, "Squat");
                assert_eq!(last, 100);
                completions += 1;
            }
            AnalysisEvent::Failed { .. } => panic!("run should not fail"),
        }
    }
    assert_eq!(completions, 1);
    Ok(())
}

#[tokio::test]
async fn recording_through_full_analysis() -> anyhow::Result<()> {
    let stream = ScriptedStream::new();
    let mut controller = AcquisitionController::new(MediaConstraints::default());
    controller.attach_stream(Box::new(stream.clone()));

    controller.start_recording().await?;
    stream.emit(vec![1; 100]).await;
    stream.emit(vec![2; 50]).await;
    controller.stop_recording().await?;

    let artifact = controller.finalize()?;
    assert_eq!(artifact.mime_type, "video/webm");
    assert_eq!(artifact.size_bytes, 150);
    match &artifact.source {
        VideoSource::Recording { data } => {
            assert_eq!(&data[..100], &[1; 100]);
            assert_eq!(&data[100..], &[2; 50]);
        }
        other => panic!("unexpected source: {other:?}"),
    }

    let pipeline =
        AnalysisPipeline::new(artifact, "Deadlift", Box::new(CannedBackend), fast_timing());
    let report = pipeline.run().await?;
    assert_eq!(report.strengths.len(), 3);
    Ok(())
}

#[tokio::test]
async fn coaching_failure_reaches_failed_without_completion() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_video(&dir, "squat.mp4", 4096);

    let mut controller = AcquisitionController::new(MediaConstraints::default());
    controller.select_file(&path)?;
    let artifact = controller.finalize()?;

    let pipeline = AnalysisPipeline::new(artifact, "Squat", Box::new(BrokenCoach), fast_timing());
    let mut rx = pipeline.subscribe();

    assert!(pipeline.run().await.is_err());

    let mut failed = 0;
    let mut last_agents = None;
    while let Ok(event) = rx.try_recv() {
        match event {
            AnalysisEvent::Progress(p) => last_agents = Some(p.agents),
            AnalysisEvent::Failed { reason, .. } => {
                assert!(reason.contains("unreachable"));
                failed += 1;
            }
            AnalysisEvent::Completed { .. } => panic!("no completion after failure"),
        }
    }
    assert_eq!(failed, 1);
    let agents = last_agents.expect("no progress events");
    assert_eq!(agents.coaching, AgentState::Processing);
    Ok(())
}

#[tokio::test]
async fn cancelled_run_is_silent() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_video(&dir, "squat.mp4", 4096);

    let mut controller = AcquisitionController::new(MediaConstraints::default());
    controller.select_file(&path)?;
    let artifact = controller.finalize()?;

    let pipeline = AnalysisPipeline::new(
        artifact,
        "Squat",
        Box::new(CannedBackend),
        StageTiming::default(),
    );
    let mut rx = pipeline.subscribe();
    let cancel = pipeline.cancel_token();

    let handle = tokio::spawn(pipeline.run());
    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();
    let result = handle.await?;
    assert!(result.is_err());

    while let Ok(event) = rx.try_recv() {
        match event {
            AnalysisEvent::Progress(_) => {}
            other => panic!("terminal event after cancellation: {other:?}"),
        }
    }
    Ok(())
}

#[tokio::test]
async fn file_beats_stale_recording_and_vice_versa() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_video(&dir, "squat.mp4", 4096);

    let stream = ScriptedStream::new();
    let mut controller = AcquisitionController::new(MediaConstraints::default());
    controller.attach_stream(Box::new(stream.clone()));

    controller.start_recording().await?;
    stream.emit(vec![5; 10]).await;
    controller.stop_recording().await?;

    // Recording completed, then a file selection: file wins
    controller.select_file(&path)?;
    assert!(matches!(
        controller.finalize()?.source,
        VideoSource::File { .. }
    ));

    // A fresh take completed after the selection: recording wins
    controller.start_recording().await?;
    stream.emit(vec![6; 10]).await;
    controller.stop_recording().await?;
    assert!(matches!(
        controller.finalize()?.source,
        VideoSource::Recording { .. }
    ));
    Ok(())
}
