//! Content normalization
//!
//! Markdown input is converted to a standalone, styled HTML document written
//! next to the source so relative links keep resolving; HTML input is loaded
//! by the browser untouched.

use crate::{InputKind, RenderError, RenderJob};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::debug;
use url::Url;

const MARKDOWN_TEMPLATE: &str = include_str!("../templates/markdown.html");

const TEMP_PREFIX: &str = "_temp_";

/// The document handed to the browser
///
/// A generated document is removed from disk when this value is dropped.
#[derive(Debug)]
pub enum NormalizedDocument {
    Original(PathBuf),
    Generated(TempPath),
}

impl NormalizedDocument {
    pub fn path(&self) -> &Path {
        match self {
            NormalizedDocument::Original(path) => path,
            NormalizedDocument::Generated(path) => path,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, NormalizedDocument::Generated(_))
    }

    pub fn url(&self) -> Result<Url, RenderError> {
        file_url(self.path())
    }

    /// Removes a generated document now instead of at drop, surfacing the error.
    pub fn cleanup(self) -> Result<(), RenderError> {
        match self {
            NormalizedDocument::Original(_) => Ok(()),
            NormalizedDocument::Generated(path) => {
                debug!("Removing temporary document {}", path.display());
                path.close().map_err(RenderError::from)
            }
        }
    }
}

pub async fn normalize(job: &RenderJob) -> Result<NormalizedDocument, RenderError> {
    match job.kind {
        InputKind::Html => Ok(NormalizedDocument::Original(job.input.clone())),
        InputKind::Markdown => {
            let bytes = tokio::fs::read(&job.input).await?;
            let source = String::from_utf8_lossy(&bytes);
            let html = render_markdown_document(&source, job.input_dir())?;
            let path = write_temp_document(job.input_dir(), &html)?;
            debug!(
                "Converted {} to temporary document {}",
                job.input.display(),
                path.display()
            );
            Ok(NormalizedDocument::Generated(path))
        }
    }
}

/// GitHub-flavoured Markdown to an HTML fragment; embedded HTML is kept verbatim.
pub fn markdown_to_html(source: &str) -> String {
    let mut options = comrak::Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.header_ids = Some(String::new());
    options.parse.smart = true;
    options.render.hardbreaks = true;
    options.render.unsafe_ = true;

    comrak::markdown_to_html(source, &options)
}

/// Wraps a fragment in the fixed stylesheet with `<base>` pointing at `base_dir`.
pub fn wrap_document(fragment: &str, base_dir: &Path) -> Result<String, RenderError> {
    let base = Url::from_directory_path(base_dir).map_err(|_| {
        RenderError::ConfigurationError(format!(
            "Cannot build a base URL from {}",
            base_dir.display()
        ))
    })?;

    Ok(MARKDOWN_TEMPLATE
        .replacen("{{base_href}}", base.as_str(), 1)
        .replacen("{{content}}", fragment, 1))
}

pub fn render_markdown_document(source: &str, base_dir: &Path) -> Result<String, RenderError> {
    wrap_document(&markdown_to_html(source), base_dir)
}

fn write_temp_document(dir: &Path, html: &str) -> Result<TempPath, RenderError> {
    let mut file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".html")
        .tempfile_in(dir)?;
    file.write_all(html.as_bytes())?;
    file.flush()?;
    Ok(file.into_temp_path())
}

pub fn file_url(path: &Path) -> Result<Url, RenderError> {
    Url::from_file_path(path).map_err(|_| {
        RenderError::NavigationFailed(format!("Not an absolute path: {}", path.display()))
    })
}
