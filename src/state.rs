//! Shared application state, built once at startup and handed to handlers
//! through `web::Data<AppState>`.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, OutputFormat};
use crate::generators::{Escaping, StatutoryDeclarationGenerator};
use crate::rendering::{build_renderer, PageOptions, PdfRenderer, RendererKind};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub generator: StatutoryDeclarationGenerator,
    pub renderer: Arc<dyn PdfRenderer>,
    pub page_options: PageOptions,
}

impl AppState {
    /// Build the state, constructing the PDF backend named in `config`.
    pub fn from_config(config: AppConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(900))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("statutory-declaration-server/1.0")
            .build()?;

        let renderer = build_renderer(&config.renderer, http_client);
        Ok(Self::with_renderer(config, renderer))
    }

    /// Build the state around an already constructed renderer.
    pub fn with_renderer(config: AppConfig, renderer: Arc<dyn PdfRenderer>) -> Self {
        let escaping = if config.output.escape_html {
            Escaping::Html
        } else {
            Escaping::None
        };

        Self {
            generator: StatutoryDeclarationGenerator::new().escaping(escaping),
            renderer,
            page_options: PageOptions::default(),
            config: Arc::new(config),
        }
    }

    pub fn render_timeout(&self) -> Duration {
        self.config.renderer.timeout
    }

    pub fn renderer_kind(&self) -> RendererKind {
        self.renderer.kind()
    }

    pub fn default_output(&self) -> OutputFormat {
        self.config.output.default_format
    }

    pub fn environment_label(&self) -> &'static str {
        self.config.environment.label()
    }
}
