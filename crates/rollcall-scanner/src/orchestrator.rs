//! Per-source extraction pipeline.
//!
//! This module provides the [`ExtractionPipeline`], which drives one source
//! through authentication, navigation with retries, expansion and scrolling,
//! and returns the identities found. Captcha and throttling handling follow
//! the same shape as the navigation retry loop.

use crate::error::{Result, ScanError};
use crate::extractor::{Extractor, IdentityFilter};
use crate::loader::IncrementalLoader;
use crate::revealer::Revealer;
use crate::selectors;
use crate::timing::pause;
use rand::Rng;
use rollcall_browser::{persist_auth_state, restore_auth_state, PageActions};
use rollcall_core::{AppConfig, BrowserConfig, IdentitySet, ScanningConfig, Source};
use std::fmt;
use std::time::Duration;
use tracing::Instrument;

/// Stages a single source passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStage {
    /// Nothing done yet
    Init,
    /// Restoring and checking credentials
    Authenticating,
    /// Loading the thread page
    Navigating,
    /// Revealing collapsed replies
    Expanding,
    /// Loading lazily rendered replies
    Scrolling,
    /// Final diagnostics
    Finalizing,
    /// Identities returned
    Done,
    /// Extraction abandoned
    Failed,
}

impl fmt::Display for SourceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Authenticating => "authenticating",
            Self::Navigating => "navigating",
            Self::Expanding => "expanding",
            Self::Scrolling => "scrolling",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Logged stage tracker for one source.
struct StageTracker {
    stage: SourceStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stage: SourceStage::Init,
        }
    }

    fn advance(&mut self, next: SourceStage) {
        tracing::info!("Stage {} -> {}", self.stage, next);
        self.stage = next;
    }

    fn fail(&mut self, error: ScanError) -> ScanError {
        tracing::error!("Stage {} -> {}: {}", self.stage, SourceStage::Failed, error);
        self.stage = SourceStage::Failed;
        error
    }
}

/// Turns one source URL into the set of identities that replied to it.
pub struct ExtractionPipeline {
    browser: BrowserConfig,
    scanning: ScanningConfig,
    revealer: Revealer,
    loader: IncrementalLoader,
}

impl ExtractionPipeline {
    /// Create a pipeline from application configuration.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let extractor = Extractor::new(IdentityFilter::from_config(&config.general));
        Self {
            browser: config.browser.clone(),
            scanning: config.scanning.clone(),
            revealer: Revealer::new(config.scanning.clone()),
            loader: IncrementalLoader::new(config.scanning.clone(), extractor),
        }
    }

    /// Extract every identity that replied on `source`.
    ///
    /// On error nothing is returned; a partially scanned set is discarded.
    pub async fn extract<P: PageActions + ?Sized>(
        &self,
        page: &P,
        source: &Source,
    ) -> Result<IdentitySet> {
        let span = tracing::info_span!("extract", role = %source.role());
        self.run(page, source).instrument(span).await
    }

    async fn run<P: PageActions + ?Sized>(&self, page: &P, source: &Source) -> Result<IdentitySet> {
        let url = source.url();
        let mut stage = StageTracker::new();
        tracing::info!("Extracting identities from {}", url);

        stage.advance(SourceStage::Authenticating);
        self.authenticate(page, url)
            .await
            .map_err(|e| stage.fail(e))?;

        stage.advance(SourceStage::Navigating);
        self.navigate_with_retry(page, url)
            .await
            .map_err(|e| stage.fail(e))?;
        self.check_challenge(page, url)
            .await
            .map_err(|e| stage.fail(e))?;
        self.handle_throttling(page).await;
        self.simulate_activity(page).await;

        stage.advance(SourceStage::Expanding);
        let report = self.revealer.reveal(page, url).await;
        tracing::info!(
            "Expansion finished after {} clicks ({:?})",
            report.revealed,
            report.stop
        );

        stage.advance(SourceStage::Scrolling);
        let identities = self.loader.load_all(page).await;

        stage.advance(SourceStage::Finalizing);
        let replies = page.count_xpath(selectors::REPLY_ARTICLE).await.unwrap_or(0);
        let articles = page.count_xpath(selectors::ANY_ARTICLE).await.unwrap_or(0);
        tracing::info!(
            "Found {} reply articles and {} total articles in final viewport",
            replies,
            articles
        );

        stage.advance(SourceStage::Done);
        tracing::info!("Extracted {} identities from {}", identities.len(), url);
        Ok(identities)
    }

    /// Restore credentials and confirm the session is signed in.
    async fn authenticate<P: PageActions + ?Sized>(&self, page: &P, url: &str) -> Result<()> {
        page.navigate(&self.browser.home_url).await?;
        pause(self.scanning.settle_delay).await;

        restore_auth_state(
            page,
            &self.browser.auth_bundle_path,
            &self.browser.default_cookie_domain,
        )
        .await
        .map_err(|e| ScanError::CredentialsUnavailable {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!("Reloading to apply credentials");
        page.reload().await?;
        pause(self.scanning.settle_delay).await;

        let check_timeout = Duration::from_millis(self.scanning.auth_check_timeout_ms);
        if page
            .wait_for_xpath(selectors::HOME_LINK, check_timeout)
            .await
            .is_ok()
        {
            tracing::info!("Authentication successful");
        } else if page.exists(selectors::SIGN_IN_LINK).await.unwrap_or(false) {
            return Err(ScanError::CredentialsRejected {
                url: url.to_string(),
            });
        } else {
            tracing::warn!("Authentication status unclear; proceeding");
        }

        persist_auth_state(page, &self.browser.auth_bundle_path).await;
        self.simulate_activity(page).await;
        Ok(())
    }

    /// Load the thread, retrying timeouts with exponential backoff.
    async fn navigate_with_retry<P: PageActions + ?Sized>(&self, page: &P, url: &str) -> Result<()> {
        let attempts = self.scanning.max_retries + 1;
        let page_timeout = Duration::from_millis(self.scanning.page_load_timeout_ms);
        let content_timeout = Duration::from_millis(self.scanning.content_timeout_ms);

        for attempt in 0..attempts {
            tracing::info!("Navigating to {} (attempt {}/{})", url, attempt + 1, attempts);

            let loaded = async {
                page.navigate(url).await?;
                page.wait_for_xpath(selectors::ANY_ARTICLE, page_timeout).await?;
                pause(self.scanning.post_navigation_delay).await;
                page.wait_for_xpath(selectors::TWEET_ARTICLE, content_timeout)
                    .await
            }
            .await;

            match loaded {
                Ok(()) => {
                    tracing::info!("Main post and initial content loaded");
                    return Ok(());
                }
                Err(e) => {
                    self.check_challenge(page, url).await?;
                    if attempt + 1 >= attempts {
                        break;
                    }
                    let delay = self.scanning.retry_backoff(attempt + 1);
                    tracing::warn!(
                        "Navigation failed for {} (attempt {}/{}): {}; retrying in {:?}",
                        url,
                        attempt + 1,
                        attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(ScanError::NavigationTimeout {
            url: url.to_string(),
            attempts,
        })
    }

    async fn check_challenge<P: PageActions + ?Sized>(&self, page: &P, url: &str) -> Result<()> {
        if page.exists(selectors::CAPTCHA_FRAME).await.unwrap_or(false) {
            return Err(ScanError::ChallengeDetected {
                url: url.to_string(),
            });
        }
        Ok(())
    }

    /// Wait out a throttling notice once, then carry on.
    async fn handle_throttling<P: PageActions + ?Sized>(&self, page: &P) {
        if page.exists(selectors::THROTTLE_NOTICE).await.unwrap_or(false) {
            tracing::warn!("Rate limiting detected; cooling down");
            pause(self.scanning.rate_limit_cooldown).await;
        }
    }

    /// A couple of pointer movements between page interactions.
    async fn simulate_activity<P: PageActions + ?Sized>(&self, page: &P) {
        let (first, second) = {
            let mut rng = rand::thread_rng();
            (
                (rng.gen_range(10.0..100.0), rng.gen_range(10.0..100.0)),
                (rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)),
            )
        };

        if let Err(e) = page.move_pointer(first.0, first.1).await {
            tracing::debug!("Pointer movement failed: {}", e);
            return;
        }
        pause(self.scanning.activity_delay).await;
        if let Err(e) = page
            .move_pointer(f64::max(first.0 + second.0, 0.0), f64::max(first.1 + second.1, 0.0))
            .await
        {
            tracing::debug!("Pointer movement failed: {}", e);
        }
        pause(self.scanning.activity_delay).await;
    }
}
