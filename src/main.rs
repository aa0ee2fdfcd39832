//! Demo binary: acquire a video file and run the staged analysis
//! against the canned backend, printing the report as JSON.

use biome_coach::acquisition::{AcquisitionController, MediaConstraints};
use biome_coach::analysis::{AnalysisEvent, AnalysisPipeline, CannedBackend, StageTiming};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    biome_coach::init_tracing();
    tracing::info!("Starting Biome Coach v{}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: biome-coach <video-file> [exercise]");
        std::process::exit(2);
    };
    let exercise = args.next().unwrap_or_else(|| "Squat".to_string());

    let mut controller = AcquisitionController::new(MediaConstraints::default());
    controller.select_file(&path)?;
    let artifact = controller.finalize()?;

    let pipeline = AnalysisPipeline::new(
        artifact,
        &exercise,
        Box::new(CannedBackend),
        StageTiming::default(),
    );
    let mut events = pipeline.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let AnalysisEvent::Progress(p) = event {
                tracing::info!(progress = p.progress, stage = %p.stage, "Analyzing");
            }
        }
    });

    let report = pipeline.run().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
