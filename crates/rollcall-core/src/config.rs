//! Configuration management for Rollcall.
//!
//! One TOML file at the platform config path, partially overridable from the
//! environment. Every timing bound used by the extraction
//! pipeline lives here so it can be tuned without a rebuild.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything the bot reads at startup.
///
/// Lives at `~/.config/rollcall/config.toml` on Linux. A missing file means
/// all defaults; a partial one fills the gaps from defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Browser session settings
    pub browser: BrowserConfig,
    /// Extraction bounds and pacing
    pub scanning: ScanningConfig,
    /// Reply transport settings
    pub transport: TransportConfig,
}

impl AppConfig {
    /// Load configuration from the default path, falling back to defaults if not found.
    ///
    /// # Errors
    /// Fails when no config directory exists for this platform, or when the
    /// file is present but unreadable, malformed or invalid.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if not found.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        let config = if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            toml::from_str(&contents)?
        } else {
            tracing::debug!("Config file not found, using defaults");
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Load from `config_path` (or the default path), then apply the
    /// environment:
    /// - `ROLLCALL_HEADLESS`: Override browser headless mode (true/false)
    /// - `ROLLCALL_AUTH_BUNDLE`: Override the credential bundle path
    /// - `ROLLCALL_OPERATOR_HANDLE`: Override the reserved operator identity
    /// - `ROLLCALL_ADMINS`: Comma-separated list of privileged actors
    pub fn load_with_env(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("ROLLCALL_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(val) = lookup("ROLLCALL_AUTH_BUNDLE") {
            if !val.trim().is_empty() {
                self.browser.auth_bundle_path = PathBuf::from(val.trim());
                tracing::debug!(
                    "Override browser.auth_bundle_path from env: {}",
                    self.browser.auth_bundle_path.display()
                );
            }
        }

        if let Some(val) = lookup("ROLLCALL_OPERATOR_HANDLE") {
            let handle = val.trim();
            self.general.operator_handle = (!handle.is_empty()).then(|| handle.to_string());
            tracing::debug!("Override general.operator_handle from env");
        }

        if let Some(val) = lookup("ROLLCALL_ADMINS") {
            self.transport.admins = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect();
            tracing::debug!(
                "Override transport.admins from env ({} entries)",
                self.transport.admins.len()
            );
        }
    }

    /// Reject values that would make the pipeline unable to make progress.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.general.identity_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.identity_prefix".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.scanning.max_scroll_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanning.max_scroll_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.scanning.max_click_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanning.max_click_retries".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.transport.max_verification_links == 0 {
            return Err(ConfigError::InvalidValue {
                field: "transport.max_verification_links".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.transport.max_message_chars < 16 {
            return Err(ConfigError::InvalidValue {
                field: "transport.max_message_chars".to_string(),
                reason: "must be at least 16".to_string(),
            });
        }

        let jitters = [
            ("scanning.settle_delay", &self.scanning.settle_delay),
            ("scanning.post_navigation_delay", &self.scanning.post_navigation_delay),
            ("scanning.activity_delay", &self.scanning.activity_delay),
            ("scanning.click_delay", &self.scanning.click_delay),
            ("scanning.click_retry_delay", &self.scanning.click_retry_delay),
            ("scanning.scroll_delay", &self.scanning.scroll_delay),
            ("scanning.final_scan_delay", &self.scanning.final_scan_delay),
            ("scanning.rate_limit_cooldown", &self.scanning.rate_limit_cooldown),
        ];
        for (field, jitter) in jitters {
            if jitter.min_ms > jitter.max_ms {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("min_ms {} exceeds max_ms {}", jitter.min_ms, jitter.max_ms),
                });
            }
        }

        Ok(())
    }

    /// Settings that load fine but weaken guarantees, one message each.
    #[must_use]
    pub fn startup_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.general.operator_handle.is_none() {
            warnings.push(
                "general.operator_handle is unset; the operator's own handle will be reported as a participant"
                    .to_string(),
            );
        }
        warnings
    }

    /// Save configuration to the given path.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, config_path: &Path) -> ConfigResult<()> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Default location of `config.toml`.
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "rollcall", "rollcall").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// The operator's own handle, never reported as a participant
    pub operator_handle: Option<String>,
    /// Prefix every accepted identity must start with
    pub identity_prefix: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            operator_handle: None,
            identity_prefix: "@".to_string(),
        }
    }
}

/// Browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Launch Chromium without a window
    pub headless: bool,
    /// Viewport width in pixels
    pub window_width: u32,
    /// Viewport height in pixels
    pub window_height: u32,
    /// Landing page visited before credentials are applied
    pub home_url: String,
    /// JSON credential bundle restored into every session
    pub auth_bundle_path: PathBuf,
    /// Domain assigned to bundle entries that carry none
    pub default_cookie_domain: String,
    /// Timeout for a single devtools request in seconds
    pub request_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            home_url: "https://x.com".to_string(),
            auth_bundle_path: PathBuf::from("cookies.json"),
            default_cookie_domain: ".x.com".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl BrowserConfig {
    /// Devtools request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// A randomized delay range in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jitter {
    /// Lower bound, inclusive
    pub min_ms: u64,
    /// Upper bound, inclusive
    pub max_ms: u64,
}

impl Jitter {
    /// Create a jitter range.
    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that never sleeps.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0, 0)
    }
}

/// Extraction bounds, timeouts and pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Wait for the first article after navigating
    pub page_load_timeout_ms: u64,
    /// Wait for reply articles once the page is up
    pub content_timeout_ms: u64,
    /// Wait for the authenticated navigation marker after applying credentials
    pub auth_check_timeout_ms: u64,
    /// Wait per expansion matcher
    pub affordance_timeout_ms: u64,
    /// Wait for an expansion affordance to become clickable
    pub actionable_timeout_ms: u64,
    /// Wait for the reply count to grow after a scroll
    pub growth_wait_ms: u64,
    /// Navigation retries after the first attempt
    pub max_retries: u32,
    /// First navigation backoff, doubled per retry
    pub retry_backoff_base_ms: u64,
    /// Cap on navigation backoff
    pub retry_backoff_max_ms: u64,
    /// Upper bound on expansion clicks
    pub max_expand_attempts: u32,
    /// Click tries per expansion attempt
    pub max_click_retries: u32,
    /// Upper bound on scroll steps
    pub max_scroll_attempts: u32,
    /// Pixels scrolled per step
    pub scroll_step_px: i64,
    /// Pause after landing and reloading
    pub settle_delay: Jitter,
    /// Pause between the first article and the reply wait
    pub post_navigation_delay: Jitter,
    /// Pause between simulated pointer moves
    pub activity_delay: Jitter,
    /// Pause after a successful expansion click
    pub click_delay: Jitter,
    /// Pause after a failed click before trying again
    pub click_retry_delay: Jitter,
    /// Pause after each scroll step
    pub scroll_delay: Jitter,
    /// Pause after returning to the top before the last scan
    pub final_scan_delay: Jitter,
    /// Cooldown when the source reports throttling
    pub rate_limit_cooldown: Jitter,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            page_load_timeout_ms: 90_000,
            content_timeout_ms: 20_000,
            auth_check_timeout_ms: 10_000,
            affordance_timeout_ms: 5_000,
            actionable_timeout_ms: 5_000,
            growth_wait_ms: 10_000,
            max_retries: 3,
            retry_backoff_base_ms: 5_000,
            retry_backoff_max_ms: 40_000,
            max_expand_attempts: 20,
            max_click_retries: 3,
            max_scroll_attempts: 30,
            scroll_step_px: 500,
            settle_delay: Jitter::new(3_000, 5_000),
            post_navigation_delay: Jitter::new(5_000, 10_000),
            activity_delay: Jitter::new(500, 1_500),
            click_delay: Jitter::new(6_000, 9_000),
            click_retry_delay: Jitter::new(2_000, 4_000),
            scroll_delay: Jitter::new(6_000, 8_000),
            final_scan_delay: Jitter::new(5_000, 7_000),
            rate_limit_cooldown: Jitter::new(60_000, 65_000),
        }
    }
}

impl ScanningConfig {
    /// A configuration with every delay and wait set to zero. Bounds are kept.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            page_load_timeout_ms: 0,
            content_timeout_ms: 0,
            auth_check_timeout_ms: 0,
            affordance_timeout_ms: 0,
            actionable_timeout_ms: 0,
            growth_wait_ms: 0,
            retry_backoff_base_ms: 0,
            retry_backoff_max_ms: 0,
            settle_delay: Jitter::none(),
            post_navigation_delay: Jitter::none(),
            activity_delay: Jitter::none(),
            click_delay: Jitter::none(),
            click_retry_delay: Jitter::none(),
            scroll_delay: Jitter::none(),
            final_scan_delay: Jitter::none(),
            rate_limit_cooldown: Jitter::none(),
            ..Self::default()
        }
    }

    /// Backoff before navigation retry number `attempt` (1-based).
    #[must_use]
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let ms = self
            .retry_backoff_base_ms
            .saturating_mul(factor)
            .min(self.retry_backoff_max_ms);
        Duration::from_millis(ms)
    }
}

/// Reply transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Longest reply the transport accepts, in characters
    pub max_message_chars: usize,
    /// Actors allowed to issue commands outside private channels
    pub admins: Vec<String>,
    /// Most verification links one job may ask for
    pub max_verification_links: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 4000,
            admins: Vec::new(),
            max_verification_links: 50,
        }
    }
}
