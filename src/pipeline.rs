//! The conversion pipeline
//!
//! normalize → launch → rasterize → close → crop, one document per run. The
//! browser is closed and the temporary document removed before cropping, on
//! both the success and the failure path; the uncropped capture is a
//! [`TempPath`] so any early return deletes it.

use crate::crop::{finalize, SaveOutcome};
use crate::document::{normalize, NormalizedDocument};
use crate::timing::{record_outcome, RunOutcome, Stage, StageTimer};
use crate::{format_capture, format_duration};
use crate::{ChromeRenderer, Config, ContentSize, Rasterizer, RenderError, RenderJob};
use std::time::{Duration, Instant};
use tempfile::TempPath;
use tracing::{debug, info, warn};

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct SaveReport {
    pub outcome: SaveOutcome,
    pub scale: f64,
    pub content: ContentSize,
    pub duration: Duration,
}

impl SaveReport {
    /// The line printed to stdout.
    pub fn message(&self) -> String {
        match &self.outcome {
            SaveOutcome::Cropped { path, .. } => {
                format!("Saved: {} (scale: {}x)", path.display(), self.scale)
            }
            SaveOutcome::Uncropped { path, .. } => {
                format!(
                    "Saved without cropping: {} (scale: {}x)",
                    path.display(),
                    self.scale
                )
            }
        }
    }
}

/// Runs the whole conversion with a headless Chrome instance.
pub async fn run(job: &RenderJob, config: &Config) -> Result<SaveReport, RenderError> {
    info!("Rendering {}", job.input.display());

    let timer = StageTimer::start(Stage::Normalize);
    let document = normalize(job).await;
    timer.finish();
    let document = document.inspect_err(|_| record_outcome(RunOutcome::Failed))?;

    let timer = StageTimer::start(Stage::Launch);
    let renderer = ChromeRenderer::launch(config).await;
    timer.finish();
    // An early return here drops `document`, which removes a generated file
    let mut renderer = renderer.inspect_err(|_| record_outcome(RunOutcome::Failed))?;

    render_document(job, config, document, &mut renderer).await
}

/// Rasterizes an already normalized document and writes the final PNG.
///
/// `rasterizer` is closed before this returns, whatever the outcome.
pub async fn render_document<R: Rasterizer>(
    job: &RenderJob,
    config: &Config,
    document: NormalizedDocument,
    rasterizer: &mut R,
) -> Result<SaveReport, RenderError> {
    let started = Instant::now();
    let capture = TempPath::from_path(&job.uncropped_path);

    let timer = StageTimer::start(Stage::Render);
    let rendered = rasterize(job, &document, rasterizer, &capture).await;
    timer.finish();

    rasterizer.close().await;
    if let Err(e) = document.cleanup() {
        warn!("Failed to remove temporary document: {}", e);
    }

    let content = match rendered {
        Ok(content) => content,
        Err(e) => {
            record_outcome(RunOutcome::Failed);
            return Err(e);
        }
    };

    if let (Ok(meta), Ok(dimensions)) = (
        std::fs::metadata(&capture),
        image::image_dimensions(&capture),
    ) {
        debug!(
            "Captured {} for {}x{} CSS px",
            format_capture(dimensions, meta.len()),
            content.width,
            content.height
        );
    }

    let timer = StageTimer::start(Stage::Crop);
    let outcome = finalize(capture, &job.output_path, config.crop);
    timer.finish();
    let outcome = outcome.inspect_err(|_| record_outcome(RunOutcome::Failed))?;

    record_outcome(if outcome.was_cropped() {
        RunOutcome::Cropped
    } else {
        RunOutcome::Uncropped
    });

    let duration = started.elapsed();
    info!(
        "Wrote {} in {}",
        outcome.path().display(),
        format_duration(duration)
    );

    Ok(SaveReport {
        outcome,
        scale: job.scale,
        content,
        duration,
    })
}

async fn rasterize<R: Rasterizer>(
    job: &RenderJob,
    document: &NormalizedDocument,
    rasterizer: &mut R,
    capture: &TempPath,
) -> Result<ContentSize, RenderError> {
    tokio::fs::create_dir_all(&job.output_dir).await?;
    let url = document.url()?;
    rasterizer.rasterize(&url, job.scale, capture).await
}
