//! Biome Coach - exercise-form analysis, staged.
//!
//! This crate turns a short exercise video into a structured coaching
//! report. Acquisition (file selection or live recording) produces a
//! `VideoArtifact`, which the caller hands to an `AnalysisPipeline`
//! that reports staged progress and yields a `FormReport`.

pub mod acquisition;
pub mod analysis;
pub mod capture;
pub mod utils;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biome_coach=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
