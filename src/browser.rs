//! Headless Chrome session management
//!
//! A [`BrowserSession`] owns one Chrome process, the task that drives its
//! DevTools connection, a single page and a throwaway profile directory.
//! All of them are released by [`BrowserSession::close`].

use crate::{create_browser_config, Config, RenderError};
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct BrowserSession {
    browser: Browser,
    /// Background task handling Chrome DevTools Protocol communication
    handler: JoinHandle<()>,
    page: Page,
    /// Profile directory, removed when the session is dropped
    profile: TempDir,
}

impl BrowserSession {
    pub async fn launch(config: &Config) -> Result<Self, RenderError> {
        let profile = tempfile::Builder::new()
            .prefix("html2png-profile-")
            .tempdir()
            .map_err(|e| {
                RenderError::BrowserLaunchFailed(format!("Failed to create profile dir: {e}"))
            })?;

        let browser_config = create_browser_config(config, profile.path())?;
        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| RenderError::BrowserLaunchFailed(e.to_string()))?;

        // The handler implements Stream and must be polled for any command to complete
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Handler error: {}", e);
                }
            }
            debug!("Handler stream ended");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                if let Err(e) = browser.close().await {
                    debug!("Failed to close browser after page error: {}", e);
                }
                if let Err(e) = browser.wait().await {
                    debug!("Failed to wait for browser exit: {}", e);
                }
                handler.abort();
                return Err(RenderError::BrowserLaunchFailed(format!(
                    "Failed to open page: {e}"
                )));
            }
        };

        info!("Browser launched");
        Ok(Self {
            browser,
            handler,
            page,
            profile,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Closes the page and the browser, then stops the handler task.
    ///
    /// Failures are logged, not returned: closing runs on error paths too.
    pub async fn close(self) {
        let Self {
            mut browser,
            handler,
            page,
            profile,
        } = self;

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }
        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }
        handler.abort();

        if let Err(e) = profile.close() {
            debug!("Failed to remove browser profile: {}", e);
        }
        info!("Browser closed");
    }
}
