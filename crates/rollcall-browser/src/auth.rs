//! Persisted credential bundle.
//!
//! The bundle is a JSON array of cookie-like entries. Entries are read,
//! filtered by expiry and written back in their original order; fields this
//! crate does not model are carried through untouched.

use crate::error::{BrowserError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One credential entry of the bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthEntry {
    #[serde(alias = "token")]
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Seconds since the Unix epoch; absent or `-1` never expires.
    #[serde(
        default,
        alias = "expiry",
        alias = "expirationDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AuthEntry {
    /// Create a minimal entry.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            expires: None,
            secure: None,
            http_only: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Whether the entry is still valid at `now` (seconds since the epoch).
    pub fn is_live_at(&self, now: f64) -> bool {
        match self.expires {
            None => true,
            Some(expires) if (expires + 1.0).abs() < f64::EPSILON => true,
            Some(expires) => expires > now,
        }
    }
}

/// Read and parse the bundle at `path`.
pub fn load_bundle(path: &Path) -> Result<Vec<AuthEntry>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        BrowserError::AuthBundle(format!("cannot read {}: {e}", path.display()))
    })?;

    let value: serde_json::Value = serde_json::from_str(&contents)?;
    if !value.is_array() {
        return Err(BrowserError::AuthBundle(format!(
            "{} must contain a list of entries",
            path.display()
        )));
    }

    Ok(serde_json::from_value(value)?)
}

/// Keep the entries that are live at `now`, filling in `default_domain`
/// where an entry has none.
pub fn live_entries(entries: Vec<AuthEntry>, now: f64, default_domain: &str) -> Vec<AuthEntry> {
    entries
        .into_iter()
        .filter(|entry| entry.is_live_at(now))
        .map(|mut entry| {
            if entry.domain.is_none() {
                entry.domain = Some(default_domain.to_string());
            }
            entry
        })
        .collect()
}

/// Write `entries` to `path` as pretty-printed JSON.
pub fn save_bundle(path: &Path, entries: &[AuthEntry]) -> Result<()> {
    let contents = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Current wall-clock time in seconds since the epoch.
#[allow(clippy::cast_precision_loss)]
pub fn now_secs() -> f64 {
    chrono::Utc::now().timestamp() as f64
}
