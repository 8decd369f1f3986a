//! Expansion of collapsed replies.
//!
//! Threads hide part of their replies behind "show more" affordances. The
//! revealer clicks them until none are left, nothing new appears, or the
//! attempt bound is reached.

use crate::selectors;
use crate::timing::pause;
use rollcall_browser::PageActions;
use rollcall_core::ScanningConfig;
use std::time::Duration;

/// Why the reveal loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStop {
    /// No expansion affordance is rendered
    NoAffordance,
    /// A click produced no new reply units
    Converged,
    /// An affordance could not be clicked within the retry budget
    InteractionFailed,
    /// The page wandered off and could not be brought back
    NavigationLost,
    /// The configured attempt bound was reached
    AttemptBound,
}

/// Outcome of one reveal run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealReport {
    /// Successful expansion clicks
    pub revealed: u32,
    /// Reply units rendered when the loop ended
    pub reply_units: usize,
    /// Why the loop ended
    pub stop: RevealStop,
}

/// A way of locating an expansion affordance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionMatcher {
    /// Label for logs
    pub name: String,
    /// Query locating the affordance
    pub xpath: String,
}

/// Matchers in the order they are tried: exact labels, case-insensitive
/// label fragments, then the structural fallback.
pub fn expansion_matchers() -> Vec<ExpansionMatcher> {
    let mut matchers = vec![ExpansionMatcher {
        name: "exact-label".to_string(),
        xpath: selectors::exact_label_xpath(&selectors::EXPANSION_LABELS),
    }];
    matchers.extend(
        selectors::EXPANSION_LABELS
            .iter()
            .map(|label| ExpansionMatcher {
                name: format!("label:{}", label.to_lowercase()),
                xpath: selectors::label_contains_xpath(label),
            }),
    );
    matchers.push(ExpansionMatcher {
        name: "structural".to_string(),
        xpath: selectors::STRUCTURAL_EXPANSION.to_string(),
    });
    matchers
}

/// Clicks expansion affordances until the thread stops growing.
#[derive(Debug, Clone)]
pub struct Revealer {
    config: ScanningConfig,
    matchers: Vec<ExpansionMatcher>,
}

impl Revealer {
    /// Create a revealer with the default matchers.
    pub fn new(config: ScanningConfig) -> Self {
        Self {
            config,
            matchers: expansion_matchers(),
        }
    }

    /// Expand collapsed replies on the page showing `target`.
    ///
    /// Never fails: every problem ends the loop with a [`RevealStop`] and the
    /// caller goes on to scrolling.
    pub async fn reveal<P: PageActions + ?Sized>(&self, page: &P, target: &str) -> RevealReport {
        let mut previous = page
            .count_xpath(selectors::REPLY_ARTICLE)
            .await
            .unwrap_or(0);
        let mut revealed = 0;

        for attempt in 0..self.config.max_expand_attempts {
            if !self.ensure_on_target(page, target).await {
                return Self::report(revealed, previous, RevealStop::NavigationLost);
            }

            let Some(matcher) = self.locate(page).await else {
                tracing::info!("No expansion affordance found after trying all matchers");
                return Self::report(revealed, previous, RevealStop::NoAffordance);
            };

            tracing::info!(
                "Clicking expansion affordance {} (attempt {}/{})",
                matcher.name,
                attempt + 1,
                self.config.max_expand_attempts
            );
            if !self.click_with_retries(page, matcher).await {
                tracing::warn!("Failed to click expansion affordance after retries; stopping expansion");
                return Self::report(revealed, previous, RevealStop::InteractionFailed);
            }
            revealed += 1;

            let current = match page.count_xpath(selectors::REPLY_ARTICLE).await {
                Ok(count) => count,
                Err(e) => {
                    tracing::debug!("Reply count unavailable after expansion: {}", e);
                    previous
                }
            };
            if current == previous {
                tracing::info!("No new replies after expansion; stopping");
                return Self::report(revealed, current, RevealStop::Converged);
            }
            previous = current;
        }

        tracing::info!(
            "Expansion attempt bound ({}) reached",
            self.config.max_expand_attempts
        );
        Self::report(revealed, previous, RevealStop::AttemptBound)
    }

    fn report(revealed: u32, reply_units: usize, stop: RevealStop) -> RevealReport {
        RevealReport {
            revealed,
            reply_units,
            stop,
        }
    }

    /// Bring the page back to `target` if client-side navigation moved it.
    async fn ensure_on_target<P: PageActions + ?Sized>(&self, page: &P, target: &str) -> bool {
        match page.current_url().await {
            Ok(url) if url.contains(target) => return true,
            Ok(url) => tracing::warn!("Page moved to {}; re-navigating to target", url),
            Err(e) => tracing::warn!("Current location unavailable ({}); re-navigating", e),
        }

        if let Err(e) = page.navigate(target).await {
            tracing::warn!("Re-navigation to {} failed: {}", target, e);
            return false;
        }
        let timeout = Duration::from_millis(self.config.page_load_timeout_ms);
        match page.wait_for_xpath(selectors::ANY_ARTICLE, timeout).await {
            Ok(()) => {
                tracing::info!("Main post reloaded");
                true
            }
            Err(e) => {
                tracing::warn!("Main post did not reload: {}", e);
                false
            }
        }
    }

    /// First matcher with a rendered affordance, trying each in order.
    async fn locate<P: PageActions + ?Sized>(&self, page: &P) -> Option<&ExpansionMatcher> {
        let timeout = Duration::from_millis(self.config.affordance_timeout_ms);
        for matcher in &self.matchers {
            if page.wait_for_xpath(&matcher.xpath, timeout).await.is_ok() {
                return Some(matcher);
            }
        }
        None
    }

    async fn click_with_retries<P: PageActions + ?Sized>(
        &self,
        page: &P,
        matcher: &ExpansionMatcher,
    ) -> bool {
        let timeout = Duration::from_millis(self.config.actionable_timeout_ms);
        for click in 1..=self.config.max_click_retries {
            match page.click_xpath(&matcher.xpath, timeout).await {
                Ok(()) => {
                    pause(self.config.click_delay).await;
                    return true;
                }
                Err(e) => {
                    tracing::warn!(
                        "Error clicking expansion affordance (click attempt {}/{}): {}",
                        click,
                        self.config.max_click_retries,
                        e
                    );
                    pause(self.config.click_retry_delay).await;
                }
            }
        }
        false
    }
}
