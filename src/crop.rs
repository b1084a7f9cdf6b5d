//! Transparent-edge trimming of captured screenshots

use crate::RenderError;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, warn};

/// Pixel rectangle inside an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropOutcome {
    pub original: (u32, u32),
    pub cropped: (u32, u32),
}

/// What ended up at the output path
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Cropped {
        path: PathBuf,
        outcome: CropOutcome,
    },
    Uncropped {
        path: PathBuf,
        reason: Option<String>,
    },
}

impl SaveOutcome {
    pub fn path(&self) -> &Path {
        match self {
            SaveOutcome::Cropped { path, .. } | SaveOutcome::Uncropped { path, .. } => path,
        }
    }

    pub fn was_cropped(&self) -> bool {
        matches!(self, SaveOutcome::Cropped { .. })
    }
}

/// Smallest rectangle holding every pixel with non-zero alpha.
///
/// Returns `None` for an empty or fully transparent image.
pub fn transparent_bounds(img: &RgbaImage) -> Option<Bounds> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        found = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    found.then(|| Bounds {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

pub fn trim_image(img: &RgbaImage) -> Result<RgbaImage, RenderError> {
    let bounds = transparent_bounds(img).ok_or_else(|| {
        RenderError::CropFailed("image has no visible pixels".to_string())
    })?;
    Ok(image::imageops::crop_imm(img, bounds.x, bounds.y, bounds.width, bounds.height).to_image())
}

/// Reads `input`, trims its transparent border and writes a PNG to `output`.
pub fn trim_transparent(input: &Path, output: &Path) -> Result<CropOutcome, RenderError> {
    let img = image::open(input)?.to_rgba8();
    let trimmed = trim_image(&img)?;
    // Decoding and trimming failures are crop failures; failing to write is not
    trimmed
        .save_with_format(output, image::ImageFormat::Png)
        .map_err(|e| RenderError::IoError(format!("{}: {e}", output.display())))?;

    Ok(CropOutcome {
        original: img.dimensions(),
        cropped: trimmed.dimensions(),
    })
}

/// Moves the uncropped capture to its final place.
///
/// Recoverable trimming failures fall back to keeping the capture as-is. A
/// failure to write `output` is returned and the capture is deleted.
pub fn finalize(uncropped: TempPath, output: &Path, crop: bool) -> Result<SaveOutcome, RenderError> {
    if !crop {
        persist(uncropped, output)?;
        return Ok(SaveOutcome::Uncropped {
            path: output.to_path_buf(),
            reason: None,
        });
    }

    match trim_transparent(&uncropped, output) {
        Ok(outcome) => {
            debug!(
                "Trimmed {}x{} to {}x{}",
                outcome.original.0, outcome.original.1, outcome.cropped.0, outcome.cropped.1
            );
            if let Err(e) = uncropped.close() {
                warn!("Failed to remove uncropped capture: {}", e);
            }
            Ok(SaveOutcome::Cropped {
                path: output.to_path_buf(),
                outcome,
            })
        }
        Err(e) if !e.is_recoverable() => Err(e),
        Err(e) => {
            warn!("Cropping failed, keeping uncropped capture: {}", e);
            persist(uncropped, output)?;
            Ok(SaveOutcome::Uncropped {
                path: output.to_path_buf(),
                reason: Some(e.to_string()),
            })
        }
    }
}

fn persist(uncropped: TempPath, output: &Path) -> Result<(), RenderError> {
    uncropped
        .persist(output)
        .map(|_| ())
        .map_err(|e| RenderError::IoError(e.error.to_string()))
}
