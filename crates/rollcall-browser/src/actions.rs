use crate::auth::AuthEntry;
use crate::error::{BrowserError, Result};
use std::time::Duration;
use tokio::time::Instant;

/// Interval between element-count polls while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Rendered-content capability the extraction pipeline is written against.
///
/// All queries take XPath expressions. Implemented by
/// [`BrowserEngine`](crate::BrowserEngine) for a live page and by in-memory
/// fixtures in tests.
#[async_trait::async_trait]
pub trait PageActions: Send + Sync {
    /// Navigate to a URL and wait for the load event
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Reload the current document
    async fn reload(&self) -> Result<()>;

    /// Location of the current document
    async fn current_url(&self) -> Result<String>;

    /// Number of nodes matching an XPath expression
    async fn count_xpath(&self, xpath: &str) -> Result<usize>;

    /// Rendered text of every node matching an XPath expression
    async fn xpath_texts(&self, xpath: &str) -> Result<Vec<String>>;

    /// Scroll the first match into view, wait until it is actionable, then click it
    async fn click_xpath(&self, xpath: &str, timeout: Duration) -> Result<()>;

    /// Scroll the window vertically by `dy` pixels
    async fn scroll_by(&self, dy: i64) -> Result<()>;

    /// Scroll the window back to the origin
    async fn scroll_to_top(&self) -> Result<()>;

    /// Scrollable height of the document body
    async fn scroll_height(&self) -> Result<i64>;

    /// Move the pointer to a viewport position
    async fn move_pointer(&self, x: f64, y: f64) -> Result<()>;

    /// Credential entries currently held by the session
    async fn cookies(&self) -> Result<Vec<AuthEntry>>;

    /// Apply credential entries to the session
    async fn set_cookies(&self, entries: &[AuthEntry]) -> Result<()>;

    /// Whether at least one node matches
    async fn exists(&self, xpath: &str) -> Result<bool> {
        Ok(self.count_xpath(xpath).await? > 0)
    }

    /// Wait until at least one node matches, or time out
    async fn wait_for_xpath(&self, xpath: &str, timeout: Duration) -> Result<()> {
        poll_count(self, xpath, timeout, |count| count > 0)
            .await
            .map(|_| ())
    }

    /// Wait until more than `floor` nodes match; returns the new count
    async fn wait_for_count_above(
        &self,
        xpath: &str,
        floor: usize,
        timeout: Duration,
    ) -> Result<usize> {
        poll_count(self, xpath, timeout, |count| count > floor).await
    }
}

/// Poll `count_xpath` until `done` accepts the count or `timeout` elapses.
///
/// Query errors while polling are treated as "nothing yet": they happen
/// routinely while a document is being replaced.
async fn poll_count<P, F>(page: &P, xpath: &str, timeout: Duration, done: F) -> Result<usize>
where
    P: PageActions + ?Sized,
    F: Fn(usize) -> bool + Send,
{
    let deadline = Instant::now() + timeout;

    loop {
        let count = match page.count_xpath(xpath).await {
            Ok(count) => count,
            Err(e) => {
                tracing::debug!("count for {} failed while waiting: {}", xpath, e);
                0
            }
        };
        if done(count) {
            return Ok(count);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(BrowserError::Timeout(format!(
                "{xpath} not satisfied within {timeout:?}"
            )));
        }
        tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}

/// Render an XPath expression as a JavaScript string literal.
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Page whose match count grows by one on every query.
    struct GrowingPage {
        count: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl PageActions for GrowingPage {
        async fn navigate(&self, _url: &str) -> Result<()> {
            Ok(())
        }
        async fn reload(&self) -> Result<()> {
            Ok(())
        }
        async fn current_url(&self) -> Result<String> {
            Ok("about:blank".to_string())
        }
        async fn count_xpath(&self, _xpath: &str) -> Result<usize> {
            Ok(self.count.fetch_add(1, Ordering::SeqCst))
        }
        async fn xpath_texts(&self, _xpath: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        async fn click_xpath(&self, xpath: &str, _timeout: Duration) -> Result<()> {
            Err(BrowserError::SelectorNotFound(xpath.to_string()))
        }
        async fn scroll_by(&self, _dy: i64) -> Result<()> {
            Ok(())
        }
        async fn scroll_to_top(&self) -> Result<()> {
            Ok(())
        }
        async fn scroll_height(&self) -> Result<i64> {
            Ok(0)
        }
        async fn move_pointer(&self, _x: f64, _y: f64) -> Result<()> {
            Ok(())
        }
        async fn cookies(&self) -> Result<Vec<AuthEntry>> {
            Ok(Vec::new())
        }
        async fn set_cookies(&self, _entries: &[AuthEntry]) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_wait_for_count_above_polls_until_satisfied() {
        let page = GrowingPage {
            count: AtomicUsize::new(0),
        };
        let count = page
            .wait_for_count_above("//article", 2, Duration::from_secs(5))
            .await
            .expect("count grows past floor");
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_zero_timeout_checks_once() {
        let page = GrowingPage {
            count: AtomicUsize::new(0),
        };
        let err = page
            .wait_for_xpath("//article", Duration::ZERO)
            .await
            .expect_err("first poll sees zero nodes");
        assert!(err.is_timeout());
        assert_eq!(page.count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_js_string_escapes_quotes() {
        assert_eq!(js_string(r#"//a[@x="1"]"#), r#""//a[@x=\"1\"]""#);
    }
}
