//! Page rendering: navigation, content measurement and capture
//!
//! The pipeline talks to the browser only through the [`Rasterizer`] trait;
//! [`ChromeRenderer`] is the headless Chrome implementation.

use crate::{BrowserSession, Config, RenderError};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventLifecycleEvent, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

/// Largest of the body and root-element scroll/offset/client sizes.
const CONTENT_SIZE_SCRIPT: &str = r#"(() => {
    const body = document.body;
    const root = document.documentElement;
    return {
        width: Math.max(
            body ? body.scrollWidth : 0, root.scrollWidth,
            body ? body.offsetWidth : 0, root.offsetWidth,
            body ? body.clientWidth : 0, root.clientWidth
        ),
        height: Math.max(
            body ? body.scrollHeight : 0, root.scrollHeight,
            body ? body.offsetHeight : 0, root.offsetHeight,
            body ? body.clientHeight : 0, root.clientHeight
        )
    };
})()"#;

/// Lifecycle event Chrome fires once no requests have been in flight for 500ms.
const NETWORK_IDLE: &str = "networkIdle";

/// Full content size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSize {
    pub width: u32,
    pub height: u32,
}

impl ContentSize {
    /// Rounds browser-reported sizes up to whole pixels, never below one.
    pub fn from_metrics(width: f64, height: f64) -> Result<Self, RenderError> {
        let round = |value: f64, axis: &str| {
            if !value.is_finite() || value < 0.0 {
                return Err(RenderError::MeasureFailed(format!(
                    "invalid {axis}: {value}"
                )));
            }
            Ok((value.ceil() as u32).max(1))
        };

        Ok(Self {
            width: round(width, "width")?,
            height: round(height, "height")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawContentSize {
    width: f64,
    height: f64,
}

/// Turns a document URL into a PNG file at `target`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Rasterizer: Send {
    /// Loads `document`, fits the viewport to its content at `scale` and
    /// writes a transparent-background PNG to `target`.
    async fn rasterize(
        &mut self,
        document: &Url,
        scale: f64,
        target: &Path,
    ) -> Result<ContentSize, RenderError>;

    /// Releases every browser resource. Called exactly once, on every path.
    async fn close(&mut self);
}

pub struct ChromeRenderer {
    session: Option<BrowserSession>,
    navigation_timeout: Duration,
    wait_for_network_idle: bool,
}

impl ChromeRenderer {
    pub async fn launch(config: &Config) -> Result<Self, RenderError> {
        let session = BrowserSession::launch(config).await?;
        Ok(Self {
            session: Some(session),
            navigation_timeout: config.navigation_timeout,
            wait_for_network_idle: config.wait_for_network_idle,
        })
    }
}

#[async_trait]
impl Rasterizer for ChromeRenderer {
    async fn rasterize(
        &mut self,
        document: &Url,
        scale: f64,
        target: &Path,
    ) -> Result<ContentSize, RenderError> {
        let page = self
            .session
            .as_ref()
            .ok_or_else(|| RenderError::PageError("browser session already closed".to_string()))?
            .page();

        navigate(page, document, self.wait_for_network_idle, self.navigation_timeout).await?;

        let size = measure_content(page).await?;
        debug!("Measured content size {}x{}", size.width, size.height);

        fit_viewport(page, size, scale).await?;

        let png = capture(page).await?;
        tokio::fs::write(target, &png)
            .await
            .map_err(|e| RenderError::CaptureFailed(format!("{}: {e}", target.display())))?;

        Ok(size)
    }

    async fn close(&mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
        }
    }
}

/// Navigates and, if requested, waits until the new document's network is idle.
pub async fn navigate(
    page: &Page,
    url: &Url,
    wait_for_network_idle: bool,
    limit: Duration,
) -> Result<(), RenderError> {
    let navigation = async {
        page.execute(SetLifecycleEventsEnabledParams::new(true))
            .await
            .map_err(|e| RenderError::NavigationFailed(e.to_string()))?;

        // Subscribe before navigating so no event of the new document is missed
        let mut lifecycle = page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| RenderError::NavigationFailed(e.to_string()))?;

        debug!("Navigating to {}", url);
        page.goto(url.as_str())
            .await
            .map_err(|e| RenderError::NavigationFailed(e.to_string()))?;

        if wait_for_network_idle {
            let main_frame = page
                .mainframe()
                .await
                .map_err(|e| RenderError::NavigationFailed(e.to_string()))?;
            let events = (&mut lifecycle).map(|event| (event.frame_id.clone(), event.name.clone()));
            wait_for_network_idle_event(events, main_frame.as_ref()).await?;
            debug!("Network idle");
        }

        Ok::<(), RenderError>(())
    };

    timeout(limit, navigation)
        .await
        .map_err(|_| RenderError::Timeout(limit))?
}

/// Resolves once `networkIdle` fires for `frame` after its latest `init`.
///
/// `init` marks the start of a new document, so idle events left over from a
/// previous document are ignored.
pub async fn wait_for_network_idle_event<F, S>(
    mut events: S,
    frame: Option<&F>,
) -> Result<(), RenderError>
where
    F: PartialEq,
    S: Stream<Item = (F, String)> + Unpin,
{
    let mut document_started = false;

    while let Some((frame_id, name)) = events.next().await {
        if frame.is_some_and(|main| *main != frame_id) {
            continue;
        }
        match name.as_str() {
            "init" => document_started = true,
            NETWORK_IDLE if document_started => return Ok(()),
            _ => {}
        }
    }

    Err(RenderError::NavigationFailed(
        "page closed before the network became idle".to_string(),
    ))
}

pub async fn measure_content(page: &Page) -> Result<ContentSize, RenderError> {
    let raw: RawContentSize = page
        .evaluate(CONTENT_SIZE_SCRIPT)
        .await
        .map_err(|e| RenderError::MeasureFailed(e.to_string()))?
        .into_value()
        .map_err(|e| RenderError::MeasureFailed(e.to_string()))?;

    ContentSize::from_metrics(raw.width, raw.height)
}

pub async fn fit_viewport(page: &Page, size: ContentSize, scale: f64) -> Result<(), RenderError> {
    let emulation_params = SetDeviceMetricsOverrideParams::builder()
        .width(size.width)
        .height(size.height)
        .device_scale_factor(scale)
        .mobile(false)
        .build()
        .map_err(RenderError::PageError)?;

    page.execute(emulation_params)
        .await
        .map_err(|e| RenderError::PageError(e.to_string()))?;

    Ok(())
}

pub async fn capture(page: &Page) -> Result<Vec<u8>, RenderError> {
    let screenshot_params = ScreenshotParams::builder()
        .format(CaptureScreenshotFormat::Png)
        .omit_background(true)
        .build();

    page.screenshot(screenshot_params)
        .await
        .map_err(|e| RenderError::CaptureFailed(e.to_string()))
}
