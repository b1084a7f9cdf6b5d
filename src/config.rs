//! Configuration management with serde serialization/deserialization
//!
//! This module holds the immutable [`Config`] loaded once at startup and the
//! per-invocation [`RenderJob`] derived from it, plus the Chrome launch
//! arguments built from both.

use crate::RenderError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for html2png
///
/// Every field has a default, so a JSON config file only needs to name the
/// values it overrides.
///
/// # Examples
///
/// ```rust
/// use html2png::Config;
///
/// let config = Config {
///     scale: 2.0,
///     crop: false,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Device scale factor applied during rasterization (default: 1.0)
    pub scale: f64,

    /// Upper bound on navigation plus the network-idle wait (default: 30 seconds)
    pub navigation_timeout: Duration,

    /// Wait for Chrome's `networkIdle` lifecycle event after load (default: true)
    ///
    /// When false the page is measured as soon as the load event fires.
    pub wait_for_network_idle: bool,

    /// Trim fully transparent borders from the capture (default: true)
    pub crop: bool,

    /// Path to Chrome/Chromium executable (default: auto-detect)
    pub chrome_path: Option<String>,

    /// Page viewport the content is laid out and measured in, before the
    /// viewport is fitted to the content (default: 800x600)
    pub launch_viewport: Viewport,

    /// File extensions (without the dot, case-insensitive) treated as Markdown
    pub markdown_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scale: 1.0,
            navigation_timeout: Duration::from_secs(30),
            wait_for_network_idle: true,
            crop: true,
            chrome_path: None,
            launch_viewport: Viewport::default(),
            markdown_extensions: ["md", "markdown", "mdown", "mkd", "mkdn"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), RenderError> {
        if !is_valid_scale(self.scale) {
            return Err(RenderError::InvalidScale(self.scale.to_string()));
        }

        if self.navigation_timeout.is_zero() {
            return Err(RenderError::ConfigurationError(
                "Navigation timeout must be greater than 0".to_string(),
            ));
        }

        if self.launch_viewport.width == 0 || self.launch_viewport.height == 0 {
            return Err(RenderError::ConfigurationError(
                "Launch viewport dimensions must be greater than 0".to_string(),
            ));
        }

        if self.markdown_extensions.is_empty() {
            return Err(RenderError::ConfigurationError(
                "At least one Markdown extension is required".to_string(),
            ));
        }

        Ok(())
    }

    pub fn is_markdown_extension(&self, extension: &str) -> bool {
        self.markdown_extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
}

/// Initial page viewport
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

pub fn is_valid_scale(scale: f64) -> bool {
    scale.is_finite() && scale > 0.0
}

/// How the input document reaches the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Loaded as-is
    Html,
    /// Converted to a styled HTML document first
    Markdown,
}

/// One invocation's worth of resolved parameters
///
/// Built once from the command line and the [`Config`], then threaded through
/// every pipeline stage unchanged.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub input: PathBuf,
    pub kind: InputKind,
    pub scale: f64,
    pub output_dir: PathBuf,
    pub output_path: PathBuf,
    pub uncropped_path: PathBuf,
}

impl RenderJob {
    pub fn new(
        input: &Path,
        output_dir: Option<&Path>,
        config: &Config,
    ) -> Result<Self, RenderError> {
        if input.as_os_str().is_empty() {
            return Err(RenderError::MissingInput);
        }
        if !input.is_file() {
            return Err(RenderError::InputNotFound(input.to_path_buf()));
        }
        if !is_valid_scale(config.scale) {
            return Err(RenderError::InvalidScale(config.scale.to_string()));
        }

        let input = std::path::absolute(input)?;
        let input_dir = input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        let kind = match input.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if config.is_markdown_extension(ext) => InputKind::Markdown,
            _ => InputKind::Html,
        };

        let stem = input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or("output")
            .to_string();

        let output_dir = match output_dir {
            Some(dir) => std::path::absolute(dir)?,
            None => input_dir,
        };
        let output_path = output_dir.join(format!("{stem}.png"));
        let uncropped_path = output_dir.join(format!("{stem}.uncropped.png"));

        Ok(Self {
            input,
            kind,
            scale: config.scale,
            output_dir,
            output_path,
            uncropped_path,
        })
    }

    pub fn input_dir(&self) -> &Path {
        self.input.parent().unwrap_or_else(|| Path::new("/"))
    }
}

/// Generate Chrome command-line arguments based on configuration
///
/// ```rust
/// use html2png::{Config, get_chrome_args};
///
/// let args = get_chrome_args(&Config::default());
/// assert!(args.contains(&"--hide-scrollbars".to_string()));
/// ```
pub fn get_chrome_args(config: &Config) -> Vec<String> {
    vec![
        "--headless".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--hide-scrollbars".to_string(),
        "--force-color-profile=srgb".to_string(),
        "--disable-extensions".to_string(),
        "--disable-default-apps".to_string(),
        "--disable-sync".to_string(),
        "--no-first-run".to_string(),
        "--disable-features=TranslateUI".to_string(),
        "--disable-background-timer-throttling".to_string(),
        "--disable-renderer-backgrounding".to_string(),
        format!(
            "--window-size={},{}",
            config.launch_viewport.width, config.launch_viewport.height
        ),
    ]
}

/// Viewport emulated on every new page, so layout width follows `launch_viewport`.
pub fn page_viewport(config: &Config) -> chromiumoxide::handler::viewport::Viewport {
    chromiumoxide::handler::viewport::Viewport {
        width: config.launch_viewport.width,
        height: config.launch_viewport.height,
        device_scale_factor: None,
        ..Default::default()
    }
}

pub fn create_browser_config(
    config: &Config,
    user_data_dir: &Path,
) -> Result<chromiumoxide::browser::BrowserConfig, RenderError> {
    use chromiumoxide::browser::BrowserConfig;

    let mut builder = BrowserConfig::builder()
        .window_size(config.launch_viewport.width, config.launch_viewport.height)
        .viewport(page_viewport(config))
        .request_timeout(config.navigation_timeout)
        .user_data_dir(user_data_dir)
        .args(get_chrome_args(config));

    if let Some(chrome_path) = &config.chrome_path {
        builder = builder.chrome_executable(chrome_path);
    }

    builder.build().map_err(RenderError::BrowserLaunchFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.scale, 1.0);
        assert_eq!(config.navigation_timeout, Duration::from_secs(30));
        assert!(config.wait_for_network_idle);
        assert!(config.crop);
        assert!(config.chrome_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_json() {
        let config: Config = serde_json::from_str(r#"{"scale": 3.0, "crop": false}"#).unwrap();
        assert_eq!(config.scale, 3.0);
        assert!(!config.crop);
        assert_eq!(config.launch_viewport, Viewport::default());
    }

    #[test]
    fn test_config_validation() {
        let bad_scale = Config {
            scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad_scale.validate(), Err(RenderError::InvalidScale(_))));

        let bad_timeout = Config {
            navigation_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            bad_timeout.validate(),
            Err(RenderError::ConfigurationError(_))
        ));

        let no_extensions = Config {
            markdown_extensions: Vec::new(),
            ..Default::default()
        };
        assert!(no_extensions.validate().is_err());
    }

    #[test]
    fn test_scale_validity() {
        assert!(is_valid_scale(2.5));
        assert!(is_valid_scale(0.1));
        assert!(!is_valid_scale(0.0));
        assert!(!is_valid_scale(-1.0));
        assert!(!is_valid_scale(f64::NAN));
        assert!(!is_valid_scale(f64::INFINITY));
    }

    #[test]
    fn test_markdown_extension_matching() {
        let config = Config::default();
        assert!(config.is_markdown_extension("md"));
        assert!(config.is_markdown_extension("MD"));
        assert!(config.is_markdown_extension("markdown"));
        assert!(!config.is_markdown_extension("html"));
    }

    #[test]
    fn test_job_paths_default_to_input_dir() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("notes.md");
        std::fs::write(&input, "# hi").unwrap();

        let job = RenderJob::new(&input, None, &Config::default()).unwrap();
        assert_eq!(job.kind, InputKind::Markdown);
        assert_eq!(job.output_path, dir.path().join("notes.png"));
        assert_eq!(job.uncropped_path, dir.path().join("notes.uncropped.png"));
        assert_eq!(job.input_dir(), dir.path());
    }

    #[test]
    fn test_job_honours_output_dir() {
        let dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let input = dir.path().join("page.html");
        std::fs::write(&input, "<p>hi</p>").unwrap();

        let job = RenderJob::new(&input, Some(out.path()), &Config::default()).unwrap();
        assert_eq!(job.kind, InputKind::Html);
        assert_eq!(job.output_path, out.path().join("page.png"));
    }

    #[test]
    fn test_job_rejects_missing_input() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.html");
        let result = RenderJob::new(&missing, None, &Config::default());
        assert!(matches!(result, Err(RenderError::InputNotFound(_))));

        let result = RenderJob::new(Path::new(""), None, &Config::default());
        assert!(matches!(result, Err(RenderError::MissingInput)));
    }

    #[test]
    fn test_page_viewport_follows_launch_viewport() {
        let viewport = page_viewport(&Config::default());
        assert_eq!((viewport.width, viewport.height), (800, 600));
        assert!(!viewport.emulating_mobile);

        let config = Config {
            launch_viewport: Viewport {
                width: 1024,
                height: 300,
            },
            ..Default::default()
        };
        let viewport = page_viewport(&config);
        assert_eq!((viewport.width, viewport.height), (1024, 300));
    }

    #[test]
    fn test_chrome_args_generation() {
        let config = Config::default();
        let args = get_chrome_args(&config);

        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--hide-scrollbars".to_string()));
        assert!(args.contains(&"--window-size=800,600".to_string()));
    }
}
