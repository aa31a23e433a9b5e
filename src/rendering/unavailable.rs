use async_trait::async_trait;

use super::{PageOptions, PdfRenderer, RenderError, RendererKind};

/// Backend used when nothing else could be configured; every render fails.
#[derive(Debug, Clone)]
pub struct UnavailableRenderer {
    reason: String,
}

impl UnavailableRenderer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl PdfRenderer for UnavailableRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Unavailable
    }

    async fn render(&self, _html: &str, _options: &PageOptions) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Unavailable(self.reason.clone()))
    }
}
