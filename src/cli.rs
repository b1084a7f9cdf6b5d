use crate::{is_valid_scale, pipeline, Config, RenderError, RenderJob, SaveReport};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

pub const USAGE: &str =
    "Usage: html2png <input-file> [--scale|-s <scale>] [--output|-o <output-dir>]";

#[derive(Parser, Debug)]
#[command(name = "html2png")]
#[command(about = "Render an HTML or Markdown document to a cropped, transparent PNG")]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    #[arg(help = "HTML or Markdown file to render")]
    pub input: Option<PathBuf>,

    /// Positionals after the input; accepted and ignored
    #[arg(hide = true)]
    pub extra: Vec<PathBuf>,

    // A trailing flag without a value is ignored; a repeated flag keeps the last value
    #[arg(
        short,
        long,
        num_args = 0..=1,
        value_parser = parse_scale,
        allow_negative_numbers = true,
        help = "Device scale factor (positive number, default 1.0)"
    )]
    pub scale: Option<f64>,

    #[arg(
        short,
        long,
        num_args = 0..=1,
        help = "Output directory (default: the input file's directory)"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Configuration file path (JSON)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Navigation timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Chrome executable path")]
    pub chrome_path: Option<String>,

    #[arg(long, help = "Keep the capture as-is instead of trimming transparent edges")]
    pub no_crop: bool,

    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,
}

pub fn parse_scale(value: &str) -> Result<f64, String> {
    let scale: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;

    if !is_valid_scale(scale) {
        return Err(format!("scale must be a positive number, got '{value}'"));
    }

    Ok(scale)
}

/// Loads the configuration file, if any, and applies command-line overrides.
pub async fn load_config(args: &Cli) -> Result<Config, RenderError> {
    let mut config = if let Some(config_path) = &args.config {
        let config_content = tokio::fs::read_to_string(config_path).await.map_err(|e| {
            RenderError::ConfigurationError(format!("{}: {e}", config_path.display()))
        })?;
        serde_json::from_str(&config_content)?
    } else {
        Config::default()
    };

    apply_overrides(&mut config, args);
    config.validate()?;

    info!("Configuration loaded");
    Ok(config)
}

pub fn apply_overrides(config: &mut Config, args: &Cli) {
    if let Some(scale) = args.scale {
        config.scale = scale;
    }

    if let Some(timeout) = args.timeout {
        config.navigation_timeout = Duration::from_secs(timeout);
    }

    if let Some(chrome_path) = &args.chrome_path {
        config.chrome_path = Some(chrome_path.clone());
    }

    if args.no_crop {
        config.crop = false;
    }
}

pub struct CliRunner {
    pub config: Config,
    pub job: RenderJob,
}

impl CliRunner {
    /// Resolves the job; every usage error surfaces here, before a browser exists.
    pub fn new(config: Config, args: &Cli) -> Result<Self, RenderError> {
        let input = args.input.as_deref().ok_or(RenderError::MissingInput)?;
        if !args.extra.is_empty() {
            warn!(
                "Ignoring extra arguments: {}",
                args.extra
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            );
        }
        let job = RenderJob::new(input, args.output.as_deref(), &config)?;
        Ok(Self { config, job })
    }

    pub async fn run(&self) -> Result<SaveReport, RenderError> {
        pipeline::run(&self.job, &self.config).await
    }
}

pub fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;

    Ok(())
}
