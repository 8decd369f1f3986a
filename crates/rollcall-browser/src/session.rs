//! Ownership of the single live browser session.
//!
//! At most one [`BrowserEngine`] exists per process. It is launched lazily by
//! [`SessionManager::acquire`] and torn down by [`SessionManager::release`].

use crate::actions::PageActions;
use crate::auth::{live_entries, load_bundle, now_secs, save_bundle};
use crate::engine::BrowserEngine;
use crate::error::{BrowserError, Result};
use rollcall_core::BrowserConfig as BrowserSettings;
use std::path::Path;

/// Owner of the process-wide browser session.
pub struct SessionManager {
    settings: BrowserSettings,
    engine: Option<BrowserEngine>,
}

impl SessionManager {
    /// Create a manager; no browser is launched until [`acquire`](Self::acquire).
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            settings,
            engine: None,
        }
    }

    /// Settings used for every launch.
    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    /// Whether a session is currently live.
    pub fn is_live(&self) -> bool {
        self.engine.is_some()
    }

    /// Return the live session, launching one if none exists.
    pub async fn acquire(&mut self) -> Result<&BrowserEngine> {
        if self.engine.is_none() {
            let engine = BrowserEngine::launch(&self.settings).await?;
            self.engine = Some(engine);
        }
        self.engine
            .as_ref()
            .ok_or_else(|| BrowserError::ChromiumError("session unavailable".to_string()))
    }

    /// Tear down the live session if present. Safe to call repeatedly.
    pub async fn release(&mut self) {
        if let Some(engine) = self.engine.take() {
            tracing::info!("Closing browser session");
            if let Err(e) = engine.close().await {
                tracing::warn!("Browser did not close cleanly: {}", e);
            }
        }
    }
}

/// Apply the persisted credential bundle at `path` to the session.
///
/// Expired entries are skipped and entries without a domain get
/// `default_domain`. Returns the number of entries applied.
///
/// # Errors
/// Fails if the bundle cannot be read or parsed, holds no live entries, or
/// the session rejects them. Callers must not continue anonymously.
pub async fn restore_auth_state<P: PageActions + ?Sized>(
    page: &P,
    path: &Path,
    default_domain: &str,
) -> Result<usize> {
    tracing::info!("Loading credentials from {}", path.display());

    let entries = load_bundle(path)?;
    let total = entries.len();
    let live = live_entries(entries, now_secs(), default_domain);
    if live.is_empty() {
        return Err(BrowserError::AuthBundle(format!(
            "no unexpired entries in {} ({total} total)",
            path.display()
        )));
    }

    page.set_cookies(&live).await?;
    tracing::info!("Applied {} of {} credential entries", live.len(), total);
    Ok(live.len())
}

/// Write the session's current credentials back to `path`. Never fails;
/// problems are logged.
pub async fn persist_auth_state<P: PageActions + ?Sized>(page: &P, path: &Path) {
    let entries = match page.cookies().await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to read session credentials: {}", e);
            return;
        }
    };

    match save_bundle(path, &entries) {
        Ok(()) => tracing::info!("Saved {} credential entries to {}", entries.len(), path.display()),
        Err(e) => tracing::warn!("Failed to save credentials to {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthEntry;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Page that only stores credentials.
    #[derive(Default)]
    struct CookieJar {
        entries: Mutex<Vec<AuthEntry>>,
    }

    #[async_trait::async_trait]
    impl PageActions for CookieJar {
        async fn navigate(&self, _url: &str) -> Result<()> {
            Ok(())
        }
        async fn reload(&self) -> Result<()> {
            Ok(())
        }
        async fn current_url(&self) -> Result<String> {
            Ok("https://x.com/home".to_string())
        }
        async fn count_xpath(&self, _xpath: &str) -> Result<usize> {
            Ok(0)
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
            Ok(self.entries.lock().unwrap().clone())
        }
        async fn set_cookies(&self, entries: &[AuthEntry]) -> Result<()> {
            self.entries.lock().unwrap().extend_from_slice(entries);
            Ok(())
        }
    }

    fn write_bundle(dir: &TempDir, json: &str) -> std::path::PathBuf {
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, json).expect("write bundle");
        path
    }

    #[tokio::test]
    async fn test_restore_applies_live_entries() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = write_bundle(
            &tmp,
            r#"[
                {"name": "auth_token", "value": "a", "expires": -1},
                {"name": "stale", "value": "b", "expires": 1},
                {"name": "ct0", "value": "c", "domain": ".example.com"}
            ]"#,
        );

        let page = CookieJar::default();
        let applied = restore_auth_state(&page, &path, ".x.com")
            .await
            .expect("restore credentials");
        assert_eq!(applied, 2);

        let stored = page.entries.lock().unwrap().clone();
        assert_eq!(stored[0].name, "auth_token");
        assert_eq!(stored[0].domain.as_deref(), Some(".x.com"));
        assert_eq!(stored[1].domain.as_deref(), Some(".example.com"));
    }

    #[tokio::test]
    async fn test_restore_fails_when_everything_expired() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = write_bundle(&tmp, r#"[{"name": "old", "value": "x", "expires": 5}]"#);

        let page = CookieJar::default();
        let err = restore_auth_state(&page, &path, ".x.com")
            .await
            .expect_err("expired bundle must fail");
        assert!(matches!(err, BrowserError::AuthBundle(_)));
        assert!(page.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_fails_on_malformed_bundle() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = write_bundle(&tmp, "not json");

        let page = CookieJar::default();
        assert!(restore_auth_state(&page, &path, ".x.com").await.is_err());
    }

    #[tokio::test]
    async fn test_persist_writes_current_entries() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("cookies.json");

        let page = CookieJar::default();
        page.set_cookies(&[AuthEntry::new("auth_token", "fresh")])
            .await
            .expect("seed cookies");

        persist_auth_state(&page, &path).await;
        let saved = load_bundle(&path).expect("load saved bundle");
        assert_eq!(saved, vec![AuthEntry::new("auth_token", "fresh")]);
    }

    #[tokio::test]
    async fn test_persist_to_unwritable_path_does_not_panic() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("missing-dir").join("cookies.json");

        let page = CookieJar::default();
        persist_auth_state(&page, &path).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_release_without_session_is_noop() {
        let mut manager = SessionManager::new(BrowserSettings::default());
        assert!(!manager.is_live());
        manager.release().await;
        manager.release().await;
        assert!(!manager.is_live());
    }
}
