//! Source extraction behind a seam the command layer can fake.

use async_trait::async_trait;
use rollcall_browser::SessionManager;
use rollcall_core::{AppConfig, IdentitySet, Source};
use rollcall_scanner::{ExtractionPipeline, Result};

/// Produces the identity set of one source and owns the browser session.
#[async_trait]
pub trait SourceExtractor: Send {
    /// Extract the identities that replied on `source`.
    async fn extract(&mut self, source: &Source) -> Result<IdentitySet>;

    /// Tear down the live session, if any.
    async fn release(&mut self);
}

/// Extraction through a real browser session.
pub struct BrowserExtractor {
    session: SessionManager,
    pipeline: ExtractionPipeline,
}

impl BrowserExtractor {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            session: SessionManager::new(config.browser.clone()),
            pipeline: ExtractionPipeline::new(config),
        }
    }
}

#[async_trait]
impl SourceExtractor for BrowserExtractor {
    async fn extract(&mut self, source: &Source) -> Result<IdentitySet> {
        let page = self.session.acquire().await?;
        self.pipeline.extract(page, source).await
    }

    async fn release(&mut self) {
        self.session.release().await;
    }
}
