#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::web;
use async_trait::async_trait;
use serde_json::{json, Value};

use statutory_declaration_server::config::AppConfig;
use statutory_declaration_server::rendering::{
    PageOptions, PdfRenderer, RenderError, RendererKind,
};
use statutory_declaration_server::AppState;

pub const FAKE_PDF: &[u8] = b"%PDF-1.4 fake";

#[derive(Debug, Clone, Copy)]
pub enum MockBehaviour {
    Succeed,
    Fail,
    Slow(Duration),
}

/// In-memory renderer that records every call.
pub struct MockPdfRenderer {
    behaviour: MockBehaviour,
    calls: AtomicUsize,
    last_html: Mutex<Option<String>>,
}

impl MockPdfRenderer {
    pub fn new(behaviour: MockBehaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
            last_html: Mutex::new(None),
        })
    }

    pub fn succeeding() -> Arc<Self> {
        Self::new(MockBehaviour::Succeed)
    }

    pub fn failing() -> Arc<Self> {
        Self::new(MockBehaviour::Fail)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Self::new(MockBehaviour::Slow(delay))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_html(&self) -> Option<String> {
        self.last_html.lock().unwrap().clone()
    }
}

#[async_trait]
impl PdfRenderer for MockPdfRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Remote
    }

    async fn render(&self, html: &str, _options: &PageOptions) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_html.lock().unwrap() = Some(html.to_string());

        match self.behaviour {
            MockBehaviour::Succeed => Ok(FAKE_PDF.to_vec()),
            MockBehaviour::Fail => Err(RenderError::Api {
                status: 401,
                body: "invalid api key".to_string(),
            }),
            MockBehaviour::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(FAKE_PDF.to_vec())
            }
        }
    }
}

/// Application state around `renderer` with the given render budget.
pub fn test_state(renderer: Arc<MockPdfRenderer>, timeout: Duration) -> web::Data<AppState> {
    let mut config = AppConfig::default();
    config.renderer.timeout = timeout;
    web::Data::new(AppState::with_renderer(config, renderer))
}

/// The canonical example: a complete payload using the alias keys.
pub fn jane_tan_payload() -> Value {
    json!({
        "purchaserName": "Jane Tan",
        "nric": "900101-10-1234",
        "address": "1 Jalan X",
        "propertyAddress": "Unit 5, Block A",
        "bankName": "ABC Bank",
        "bankAddress": "HQ, KL",
        "branchAddress": "Branch, Klang",
        "facilityType": "Term Loan",
        "date": "2024-01-01"
    })
}
