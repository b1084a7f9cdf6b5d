use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("No input file given")]
    MissingInput,

    #[error("Input file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Scale must be a positive number, got '{0}'")]
    InvalidScale(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Browser launch failed: {0}")]
    BrowserLaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Content measurement failed: {0}")]
    MeasureFailed(String),

    #[error("Screenshot capture failed: {0}")]
    CaptureFailed(String),

    #[error("Cropping failed: {0}")]
    CropFailed(String),

    #[error("Page error: {0}")]
    PageError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RenderError {
    /// Errors caused by the invocation itself, reported before any resource is opened.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            RenderError::MissingInput
                | RenderError::InputNotFound(_)
                | RenderError::InvalidScale(_)
                | RenderError::ConfigurationError(_)
        )
    }

    /// Crop failures are recovered by keeping the uncropped capture.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RenderError::CropFailed(_))
    }

    pub fn exit_code(&self) -> i32 {
        1
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RenderError::CropFailed(_) => ErrorSeverity::Low,
            e if e.is_usage() => ErrorSeverity::Medium,
            RenderError::BrowserLaunchFailed(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::SerializationError(err.to_string())
    }
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::CropFailed(err.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for RenderError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        RenderError::PageError(err.to_string())
    }
}
