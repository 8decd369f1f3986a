//! Incremental loading of lazily rendered replies.

use crate::extractor::Extractor;
use crate::selectors;
use crate::timing::pause;
use rollcall_browser::PageActions;
use rollcall_core::{IdentitySet, ScanningConfig};
use std::time::Duration;

/// Scrolls the thread, scanning after every step, until the page stops growing.
#[derive(Debug, Clone)]
pub struct IncrementalLoader {
    config: ScanningConfig,
    extractor: Extractor,
}

impl IncrementalLoader {
    /// Loader using `config` bounds and pauses.
    pub fn new(config: ScanningConfig, extractor: Extractor) -> Self {
        Self { config, extractor }
    }

    /// Collect every identity reachable by scrolling.
    ///
    /// A final scan runs from the top of the page after the loop, so content
    /// re-rendered while scrolling is still captured.
    pub async fn load_all<P: PageActions + ?Sized>(&self, page: &P) -> IdentitySet {
        let mut seen = IdentitySet::new();

        let content_timeout = Duration::from_millis(self.config.content_timeout_ms);
        if let Err(e) = page
            .wait_for_xpath(selectors::REPLY_ARTICLE, content_timeout)
            .await
        {
            tracing::warn!("Replies not rendered before scrolling: {}", e);
        }

        let mut last_height = page.scroll_height().await.unwrap_or(0);
        let mut last_count = page
            .count_xpath(selectors::REPLY_ARTICLE)
            .await
            .unwrap_or(0);
        let growth_wait = Duration::from_millis(self.config.growth_wait_ms);

        let mut converged = false;
        for attempt in 1..=self.config.max_scroll_attempts {
            self.extractor.scan(page, &mut seen).await;

            if let Err(e) = page.scroll_by(self.config.scroll_step_px).await {
                tracing::warn!("Scroll failed on attempt {}: {}", attempt, e);
            }
            pause(self.config.scroll_delay).await;

            let height = page.scroll_height().await.unwrap_or(last_height);
            let count = page
                .count_xpath(selectors::REPLY_ARTICLE)
                .await
                .unwrap_or(last_count);
            tracing::debug!(
                "Scroll {}/{}: height {}, {} reply units, {} identities",
                attempt,
                self.config.max_scroll_attempts,
                height,
                count,
                seen.len()
            );

            if height == last_height && count == last_count {
                tracing::info!("Page stopped growing after {} scrolls", attempt);
                converged = true;
                break;
            }
            last_height = height;
            last_count = count;

            if page
                .wait_for_count_above(selectors::REPLY_ARTICLE, count, growth_wait)
                .await
                .is_err()
            {
                tracing::debug!("No further replies appeared within {:?}", growth_wait);
            }
        }
        if !converged {
            tracing::info!(
                "Scroll bound ({}) reached before the page stopped growing",
                self.config.max_scroll_attempts
            );
        }

        if let Err(e) = page.scroll_to_top().await {
            tracing::warn!("Could not return to top for final scan: {}", e);
        }
        pause(self.config.final_scan_delay).await;
        let late = self.extractor.scan(page, &mut seen).await;
        tracing::info!(
            "Loading finished with {} identities ({} from final scan)",
            seen.len(),
            late
        );

        seen
    }
}
