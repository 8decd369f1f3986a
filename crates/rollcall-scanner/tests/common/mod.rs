//! Scripted in-memory thread page for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use rollcall_browser::{AuthEntry, BrowserError, PageActions, Result};
use rollcall_core::{AppConfig, ScanningConfig};
use rollcall_scanner::selectors;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

pub const HOME_URL: &str = "https://x.com";
pub const THREAD_URL: &str = "https://x.com/op/status/1";
pub const OPERATOR: &str = "@op";

/// Mutable page model. Tests set fields before running and inspect them after.
#[derive(Debug, Default)]
pub struct ThreadState {
    pub url: String,
    pub credentials_valid: bool,
    pub nav_failures: u32,
    pub captcha: bool,
    pub throttled: bool,

    pub replies: Vec<String>,
    pub initial_visible: usize,
    pub visible: usize,
    pub page_size: usize,
    pub late_replies: Vec<String>,
    pub infinite: bool,

    pub affordance_xpath: String,
    pub expansions_left: u32,
    pub expand_batch: usize,
    pub click_failures: u32,
    pub drift_on_click: bool,

    pub failing_xpaths: HashSet<String>,
    pub cookies: Vec<AuthEntry>,

    pub loaded: bool,
    pub at_top: bool,
    pub navigations: u32,
    pub thread_navigations: u32,
    pub reloads: u32,
    pub clicks: u32,
    pub click_attempts: u32,
    pub scrolls: u32,
    pub pointer_moves: u32,
    pub height_extra: i64,
}

/// A thread page whose rendering is driven by [`ThreadState`].
pub struct FakeThread {
    state: Mutex<ThreadState>,
}

impl FakeThread {
    /// A signed-in thread with `replies`, of which `initial_visible` render
    /// up front and `page_size` more render per scroll.
    pub fn new(replies: &[&str], initial_visible: usize, page_size: usize) -> Self {
        let state = ThreadState {
            url: "about:blank".to_string(),
            credentials_valid: true,
            replies: replies.iter().map(|r| (*r).to_string()).collect(),
            initial_visible,
            page_size,
            affordance_xpath: selectors::exact_label_xpath(&selectors::EXPANSION_LABELS),
            ..ThreadState::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, ThreadState> {
        self.state.lock().unwrap()
    }
}

impl ThreadState {
    fn on_thread(&self) -> bool {
        self.loaded && self.url != HOME_URL && self.url != "about:blank"
    }

    fn handles(&self) -> Vec<String> {
        let mut handles: Vec<String> = self.replies.iter().take(self.visible).cloned().collect();
        if self.infinite {
            handles.extend((self.replies.len()..self.visible).map(|i| format!("@gen{i}")));
        }
        if self.at_top {
            handles.extend(self.late_replies.iter().cloned());
        }
        handles
    }

    fn cap(&self, visible: usize) -> usize {
        if self.infinite {
            visible
        } else {
            visible.min(self.replies.len())
        }
    }
}

#[async_trait]
impl PageActions for FakeThread {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut s = self.state();
        s.navigations += 1;
        s.url = url.to_string();
        s.at_top = false;
        if url == HOME_URL {
            s.loaded = true;
            return Ok(());
        }

        s.thread_navigations += 1;
        if s.nav_failures > 0 {
            s.nav_failures -= 1;
            s.loaded = false;
        } else {
            s.loaded = true;
            s.visible = s.visible.max(s.initial_visible);
        }
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.state().reloads += 1;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state().url.clone())
    }

    async fn count_xpath(&self, xpath: &str) -> Result<usize> {
        let s = self.state();
        let signed_in = s.credentials_valid && !s.cookies.is_empty();
        let count = match xpath {
            selectors::ANY_ARTICLE | selectors::TWEET_ARTICLE if s.on_thread() => s.visible + 1,
            selectors::REPLY_ARTICLE if s.on_thread() => s.visible,
            selectors::HOME_LINK => usize::from(signed_in),
            selectors::SIGN_IN_LINK => usize::from(!s.credentials_valid),
            selectors::CAPTCHA_FRAME => usize::from(s.captcha),
            selectors::THROTTLE_NOTICE => usize::from(s.throttled && s.on_thread()),
            x if x == s.affordance_xpath => usize::from(s.on_thread() && s.expansions_left > 0),
            _ => 0,
        };
        Ok(count)
    }

    async fn xpath_texts(&self, xpath: &str) -> Result<Vec<String>> {
        let s = self.state();
        if s.failing_xpaths.contains(xpath) {
            return Err(BrowserError::Script(format!("query failed: {xpath}")));
        }
        if !s.on_thread() {
            return Ok(Vec::new());
        }

        let texts = match xpath {
            selectors::USER_NAME_SPAN => s.handles(),
            selectors::ROLE_LINK => s.handles().into_iter().map(|h| format!("  {h}\n")).collect(),
            selectors::ANY_HANDLE_SPAN => {
                let mut texts = s.handles();
                texts.push(format!("Replying to {OPERATOR}"));
                texts.push(OPERATOR.to_string());
                texts.push("@".to_string());
                texts
            }
            _ => Vec::new(),
        };
        Ok(texts)
    }

    async fn click_xpath(&self, xpath: &str, _timeout: Duration) -> Result<()> {
        let mut s = self.state();
        s.click_attempts += 1;
        if xpath != s.affordance_xpath || s.expansions_left == 0 || !s.on_thread() {
            return Err(BrowserError::SelectorNotFound(xpath.to_string()));
        }
        if s.click_failures > 0 {
            s.click_failures -= 1;
            return Err(BrowserError::NotInteractable(xpath.to_string()));
        }

        s.expansions_left -= 1;
        s.clicks += 1;
        let revealed = s.visible + s.expand_batch;
        s.visible = s.cap(revealed);
        if s.drift_on_click {
            s.drift_on_click = false;
            s.url = "https://x.com/someone_else".to_string();
        }
        Ok(())
    }

    async fn scroll_by(&self, _dy: i64) -> Result<()> {
        let mut s = self.state();
        s.scrolls += 1;
        s.at_top = false;
        let loaded = s.visible + s.page_size;
        s.visible = s.cap(loaded);
        if s.infinite {
            s.height_extra += 1;
        }
        Ok(())
    }

    async fn scroll_to_top(&self) -> Result<()> {
        self.state().at_top = true;
        Ok(())
    }

    async fn scroll_height(&self) -> Result<i64> {
        let s = self.state();
        let visible = i64::try_from(s.visible).unwrap_or(i64::MAX);
        Ok(visible * 100 + s.height_extra)
    }

    async fn move_pointer(&self, _x: f64, _y: f64) -> Result<()> {
        self.state().pointer_moves += 1;
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<AuthEntry>> {
        Ok(self.state().cookies.clone())
    }

    async fn set_cookies(&self, entries: &[AuthEntry]) -> Result<()> {
        self.state().cookies.extend_from_slice(entries);
        Ok(())
    }
}

/// Write a one-entry credential bundle.
pub fn write_bundle(path: &Path) {
    std::fs::write(
        path,
        r#"[{"name": "auth_token", "value": "secret", "domain": ".x.com", "expires": -1}]"#,
    )
    .unwrap();
}

/// Zero-delay configuration reading credentials from `bundle`.
pub fn test_config(bundle: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.general.operator_handle = Some(OPERATOR.to_string());
    config.browser.home_url = HOME_URL.to_string();
    config.browser.auth_bundle_path = bundle.to_path_buf();
    config.scanning = ScanningConfig::immediate();
    config
}
