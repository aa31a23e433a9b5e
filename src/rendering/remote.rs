//! HTML-to-PDF over a third-party HTTP API (html2pdf.app compatible).

use async_trait::async_trait;
use serde::Serialize;

use super::{PageOptions, PdfRenderer, RenderError, RendererKind};
use crate::config::Secret;

/// Keep at most this much of an error body for diagnostics.
const MAX_ERROR_BODY: usize = 512;

#[derive(Serialize)]
struct RenderRequest<'a> {
    html: &'a str,
    #[serde(flatten)]
    options: &'a PageOptions,
}

pub struct RemoteApiRenderer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Secret,
}

impl RemoteApiRenderer {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, api_key: Secret) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PdfRenderer for RemoteApiRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Remote
    }

    async fn render(&self, html: &str, options: &PageOptions) -> Result<Vec<u8>, RenderError> {
        log::debug!("Requesting PDF from {} ({} bytes of HTML)", self.endpoint, html.len());

        // The key travels in the query string, so reqwest errors must not carry the URL.
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("apiKey", self.api_key.expose())])
            .json(&RenderRequest { html, options })
            .send()
            .await
            .map_err(|e| RenderError::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            log::warn!("PDF service returned {}: {}", status, body);
            return Err(RenderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RenderError::Transport(e.without_url()))?;

        Ok(bytes.to_vec())
    }
}
