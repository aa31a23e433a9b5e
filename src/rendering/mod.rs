//! PDF rendering - converts a filled HTML document to PDF bytes.
//!
//! - `remote` - third-party HTML-to-PDF API
//! - `headless` - locally installed Chromium-family browser
//! - `unavailable` - stand-in when no backend can be configured
//!
//! The backend is chosen once at startup by [`build_renderer`] and shared
//! behind `Arc<dyn PdfRenderer>`.

pub mod headless;
pub mod remote;
pub mod unavailable;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use headless::HeadlessBrowserRenderer;
pub use remote::RemoteApiRenderer;
pub use unavailable::UnavailableRenderer;

use crate::config::{RendererConfig, RendererSelection};

/// Errors produced by a PDF backend.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF rendering is unavailable: {0}")]
    Unavailable(String),

    #[error("PDF rendering timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("PDF service responded with status {status}")]
    Api { status: u16, body: String },

    #[error("PDF service request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("browser I/O failed: {0}")]
    Io(#[source] std::io::Error),

    #[error("browser exited with code {0}")]
    BrowserExit(i32),

    #[error("renderer produced an empty document")]
    EmptyOutput,
}

impl RenderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    Remote,
    Headless,
    Unavailable,
}

impl RendererKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Headless => "headless",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page layout passed to the backend. Margins are CSS pixel values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOptions {
    pub format: String,
    pub margin_top: u32,
    pub margin_right: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    pub print_background: bool,
    pub display_header_footer: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            format: "A4".to_string(),
            margin_top: 75,
            margin_right: 75,
            margin_bottom: 75,
            margin_left: 75,
            print_background: true,
            display_header_footer: false,
        }
    }
}

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    fn kind(&self) -> RendererKind;

    async fn render(&self, html: &str, options: &PageOptions) -> Result<Vec<u8>, RenderError>;
}

/// Run `renderer` with an upper bound on wall-clock time.
///
/// The in-flight render future is dropped on expiry, which aborts the HTTP
/// request or kills the browser process.
pub async fn render_with_timeout(
    renderer: &dyn PdfRenderer,
    html: &str,
    options: &PageOptions,
    budget: Duration,
) -> Result<Vec<u8>, RenderError> {
    match tokio::time::timeout(budget, renderer.render(html, options)).await {
        Ok(Ok(pdf)) if pdf.is_empty() => Err(RenderError::EmptyOutput),
        Ok(result) => result,
        Err(_) => Err(RenderError::Timeout(budget)),
    }
}

/// Construct the backend named by `config`.
///
/// Never fails: a backend that cannot be set up degrades to
/// [`UnavailableRenderer`] with the reason recorded.
pub fn build_renderer(config: &RendererConfig, client: reqwest::Client) -> Arc<dyn PdfRenderer> {
    let remote = || {
        config.api_key.clone().map(|key| {
            Arc::new(RemoteApiRenderer::new(client.clone(), config.api_url.clone(), key))
                as Arc<dyn PdfRenderer>
        })
    };
    let headless = || {
        HeadlessBrowserRenderer::discover(config.chrome_path.as_deref())
            .map(|renderer| Arc::new(renderer) as Arc<dyn PdfRenderer>)
    };

    let renderer = match config.selection {
        RendererSelection::Remote => remote().ok_or("PDF API key is not configured"),
        RendererSelection::Headless => headless().ok_or("no headless browser executable found"),
        RendererSelection::None => Err("PDF rendering is disabled"),
        RendererSelection::Auto => remote()
            .or_else(headless)
            .ok_or("no PDF API key configured and no headless browser found"),
    };

    match renderer {
        Ok(renderer) => {
            log::info!("PDF renderer: {}", renderer.kind());
            renderer
        }
        Err(reason) => {
            log::warn!("PDF renderer unavailable: {}", reason);
            Arc::new(UnavailableRenderer::new(reason))
        }
    }
}
