use crate::actions::{js_string, PageActions};
use crate::auth::AuthEntry;
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, TimeSinceEpoch};
use chromiumoxide::layout::Point;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use rollcall_core::BrowserConfig as BrowserSettings;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Interval between actionability checks while waiting to click.
const ACTIONABLE_POLL: Duration = Duration::from_millis(200);

/// Browser automation engine: one Chromium process driving one page.
pub struct BrowserEngine {
    browser: Browser,
    page: Page,
    fingerprint: FingerprintConfig,
    handler: JoinHandle<()>,
}

impl BrowserEngine {
    /// Launch a browser with a randomized client identity
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        Self::with_fingerprint(settings, FingerprintConfig::randomized(settings)).await
    }

    /// Launch a browser presenting a specific client identity
    pub async fn with_fingerprint(
        settings: &BrowserSettings,
        fingerprint: FingerprintConfig,
    ) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", fingerprint.user_agent))
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .request_timeout(settings.request_timeout());
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("browser handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        tracing::info!(
            "Browser session launched (headless: {}, agent: {})",
            settings.headless,
            fingerprint.user_agent
        );

        Ok(Self {
            browser,
            page,
            fingerprint,
            handler,
        })
    }

    /// Client identity this session presents
    pub fn fingerprint(&self) -> &FingerprintConfig {
        &self.fingerprint
    }

    /// Close the browser process and stop the event handler
    pub async fn close(mut self) -> Result<()> {
        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()));
        if closed.is_ok() {
            if let Err(e) = self.browser.wait().await {
                tracing::debug!("browser process wait failed: {}", e);
            }
        }
        self.handler.abort();
        closed.map(|_| ())
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, expression: String) -> Result<T> {
        self.page
            .evaluate(expression)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn actionable_state(&self, xpath: &str) -> Result<String> {
        self.eval(format!(
            r"(() => {{
                const el = document.evaluate({xp}, document, null,
                    XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
                if (!el) return 'missing';
                const box = el.getBoundingClientRect();
                if (box.width === 0 || box.height === 0) return 'hidden';
                if (el.disabled || el.getAttribute('aria-disabled') === 'true') return 'disabled';
                return 'ready';
            }})()",
            xp = js_string(xpath)
        ))
        .await
    }
}

#[async_trait::async_trait]
impl PageActions for BrowserEngine {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.page
            .reload()
            .await
            .map_err(|e| BrowserError::NavigationError(format!("reload: {e}")))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn count_xpath(&self, xpath: &str) -> Result<usize> {
        self.eval(format!(
            "document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
            js_string(xpath)
        ))
        .await
    }

    async fn xpath_texts(&self, xpath: &str) -> Result<Vec<String>> {
        self.eval(format!(
            r"(() => {{
                const snap = document.evaluate({xp}, document, null,
                    XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                const out = [];
                for (let i = 0; i < snap.snapshotLength; i++) {{
                    const node = snap.snapshotItem(i);
                    out.push(node.innerText ?? node.textContent ?? '');
                }}
                return out;
            }})()",
            xp = js_string(xpath)
        ))
        .await
    }

    async fn click_xpath(&self, xpath: &str, timeout: Duration) -> Result<()> {
        let element = self
            .page
            .find_xpath(xpath)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(xpath.to_string()))?;

        element
            .scroll_into_view()
            .await
            .map_err(|e| BrowserError::NotInteractable(format!("{xpath}: {e}")))?;

        let deadline = Instant::now() + timeout;
        loop {
            let state = self.actionable_state(xpath).await?;
            match state.as_str() {
                "ready" => break,
                "missing" => return Err(BrowserError::SelectorNotFound(xpath.to_string())),
                other if Instant::now() >= deadline => {
                    return Err(BrowserError::NotInteractable(format!("{xpath}: {other}")));
                }
                _ => tokio::time::sleep(ACTIONABLE_POLL).await,
            }
        }

        element
            .click()
            .await
            .map_err(|e| BrowserError::NotInteractable(format!("{xpath}: {e}")))?;
        Ok(())
    }

    async fn scroll_by(&self, dy: i64) -> Result<()> {
        self.eval::<f64>(format!("window.scrollBy(0, {dy}); window.scrollY"))
            .await
            .map(|_| ())
    }

    async fn scroll_to_top(&self) -> Result<()> {
        self.eval::<f64>("window.scrollTo(0, 0); window.scrollY".to_string())
            .await
            .map(|_| ())
    }

    async fn scroll_height(&self) -> Result<i64> {
        self.eval("document.body ? document.body.scrollHeight : 0".to_string())
            .await
    }

    async fn move_pointer(&self, x: f64, y: f64) -> Result<()> {
        self.page
            .move_mouse(Point { x, y })
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<AuthEntry>> {
        let cookies = self
            .page
            .get_cookies()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        Ok(cookies
            .into_iter()
            .map(|cookie| {
                let mut entry = AuthEntry::new(cookie.name, cookie.value);
                entry.domain = Some(cookie.domain);
                entry.path = Some(cookie.path);
                entry.expires = Some(if cookie.session { -1.0 } else { cookie.expires });
                entry.secure = Some(cookie.secure);
                entry.http_only = Some(cookie.http_only);
                entry
            })
            .collect())
    }

    async fn set_cookies(&self, entries: &[AuthEntry]) -> Result<()> {
        let mut params = Vec::with_capacity(entries.len());
        for entry in entries {
            let mut builder = CookieParam::builder()
                .name(entry.name.clone())
                .value(entry.value.clone());
            if let Some(domain) = &entry.domain {
                builder = builder.domain(domain.clone());
            }
            if let Some(path) = &entry.path {
                builder = builder.path(path.clone());
            }
            if let Some(expires) = entry.expires.filter(|e| *e > 0.0) {
                builder = builder.expires(TimeSinceEpoch::new(expires));
            }
            if let Some(secure) = entry.secure {
                builder = builder.secure(secure);
            }
            if let Some(http_only) = entry.http_only {
                builder = builder.http_only(http_only);
            }
            params.push(builder.build().map_err(BrowserError::AuthBundle)?);
        }

        self.page
            .set_cookies(params)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }
}
