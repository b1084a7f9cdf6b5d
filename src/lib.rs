//! # html2png
//!
//! Renders a single HTML or Markdown document to a PNG with a transparent
//! background, sized to the full content, scaled by a device-scale factor and
//! trimmed of transparent borders.
//!
//! ## Pipeline
//!
//! 1. **Normalize**: Markdown becomes a styled HTML document written next to
//!    the source so relative links resolve; HTML is used as-is.
//! 2. **Render**: headless Chrome loads the document, waits for network idle,
//!    measures the content and captures it at the requested scale.
//! 3. **Crop**: transparent edges are trimmed; if that fails the uncropped
//!    capture is kept.
//! 4. **Cleanup**: the browser and every temporary file are released on all
//!    paths.
//!
//! ## CLI Usage
//!
//! ```bash
//! html2png README.md --scale 2 --output renders/
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use html2png::{pipeline, Config, RenderJob};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config { scale: 2.0, ..Default::default() };
//!     let job = RenderJob::new(Path::new("README.md"), None, &config)?;
//!     let report = pipeline::run(&job, &config).await?;
//!     println!("{}", report.message());
//!     Ok(())
//! }
//! ```

/// Configuration and per-run job parameters
pub mod config;

/// Error types
pub mod error;

/// Markdown to HTML normalization
pub mod document;

/// Headless Chrome session lifecycle
pub mod browser;

/// Navigation, measurement and capture
pub mod renderer;

/// Transparent-edge trimming and the uncropped fallback
pub mod crop;

/// The end-to-end conversion pipeline
pub mod pipeline;

/// Command-line interface implementation
pub mod cli;

/// Stage timings and outcome counters
pub mod timing;

/// Utility functions and helpers
pub mod utils;


pub use browser::*;
pub use cli::*;
pub use config::*;
pub use crop::{CropOutcome, SaveOutcome};
pub use document::NormalizedDocument;
pub use error::*;
pub use pipeline::SaveReport;
pub use renderer::{ChromeRenderer, ContentSize, Rasterizer};
pub use utils::*;
