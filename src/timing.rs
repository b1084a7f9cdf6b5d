//! Stage timings and run outcomes
//!
//! Values go through the `metrics` facade and are dropped unless the
//! embedding application installs a recorder.

use crate::format_duration;
use ::metrics::{histogram, increment_counter};
use std::time::{Duration, Instant};
use tracing::debug;

pub const STAGE_SECONDS: &str = "html2png_stage_seconds";
pub const RUNS_TOTAL: &str = "html2png_runs_total";

/// Pipeline stage names used as the `stage` label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    Launch,
    Render,
    Crop,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Normalize => "normalize",
            Stage::Launch => "launch",
            Stage::Render => "render",
            Stage::Crop => "crop",
        }
    }
}

pub struct StageTimer {
    stage: Stage,
    started: Instant,
}

impl StageTimer {
    pub fn start(stage: Stage) -> Self {
        Self {
            stage,
            started: Instant::now(),
        }
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.started.elapsed();
        histogram!(STAGE_SECONDS, elapsed.as_secs_f64(), "stage" => self.stage.as_str());
        debug!("Stage {} took {}", self.stage.as_str(), format_duration(elapsed));
        elapsed
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Cropped,
    Uncropped,
    Failed,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Cropped => "cropped",
            RunOutcome::Uncropped => "uncropped",
            RunOutcome::Failed => "failed",
        }
    }
}

pub fn record_outcome(outcome: RunOutcome) {
    increment_counter!(RUNS_TOTAL, "outcome" => outcome.as_str());
}
