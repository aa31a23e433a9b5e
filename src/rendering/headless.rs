//! HTML-to-PDF through a locally installed Chromium-family browser.
//!
//! Writes the document to a temporary directory, runs the browser with
//! `--headless --print-to-pdf`, and reads the PDF back.

use std::env;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::tempdir;
use tokio::process::Command;

use super::{PageOptions, PdfRenderer, RenderError, RendererKind};

/// Executable names searched on `PATH`, in order.
const BROWSER_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "msedge",
];

/// Fixed install locations checked after `PATH`.
const WELL_KNOWN_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

#[derive(Debug, Clone)]
pub struct HeadlessBrowserRenderer {
    executable: PathBuf,
}

impl HeadlessBrowserRenderer {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Locate a browser: `configured` first, then `PATH`, then well-known paths.
    pub fn discover(configured: Option<&Path>) -> Option<Self> {
        if let Some(path) = configured {
            if path.is_file() {
                return Some(Self::new(path));
            }
            log::warn!("CHROME_PATH {} does not exist, searching elsewhere", path.display());
        }

        BROWSER_NAMES
            .iter()
            .find_map(|name| find_on_path(name))
            .or_else(|| {
                WELL_KNOWN_PATHS
                    .iter()
                    .map(PathBuf::from)
                    .find(|path| path.is_file())
            })
            .map(Self::new)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        let exe = candidate.with_extension("exe");
        exe.is_file().then_some(exe)
    })
}

/// `@page` rule carrying size and margins, since `--print-to-pdf` takes them from CSS.
fn page_style(options: &PageOptions) -> String {
    format!(
        "<style>@page {{ size: {}; margin: {}px {}px {}px {}px; }}</style>",
        options.format,
        options.margin_top,
        options.margin_right,
        options.margin_bottom,
        options.margin_left
    )
}

fn with_page_style(html: &str, options: &PageOptions) -> String {
    let style = page_style(options);
    match html.find("</head>") {
        Some(idx) => format!("{}{}{}", &html[..idx], style, &html[idx..]),
        None => format!("{style}{html}"),
    }
}

#[async_trait]
impl PdfRenderer for HeadlessBrowserRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Headless
    }

    async fn render(&self, html: &str, options: &PageOptions) -> Result<Vec<u8>, RenderError> {
        let temp_dir = tempdir().map_err(RenderError::Io)?;
        let html_path = temp_dir.path().join("document.html");
        let pdf_path = temp_dir.path().join("document.pdf");

        tokio::fs::write(&html_path, with_page_style(html, options))
            .await
            .map_err(RenderError::Io)?;

        let mut command = Command::new(&self.executable);
        command
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg(format!("--user-data-dir={}", temp_dir.path().join("profile").display()))
            .arg(format!("--print-to-pdf={}", pdf_path.display()));
        if !options.display_header_footer {
            command.arg("--no-pdf-header-footer");
        }
        if !options.print_background {
            command.arg("--disable-background-graphics");
        }

        let output = command
            .arg(format!("file://{}", html_path.display()))
            .current_dir(temp_dir.path())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(RenderError::Io)?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            log::warn!(
                "{} exited with {}: {}",
                self.executable.display(),
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(RenderError::BrowserExit(code));
        }

        tokio::fs::read(&pdf_path).await.map_err(RenderError::Io)
    }
}
