//! Extraction failures.

use rollcall_browser::BrowserError;
use thiserror::Error;

/// Reasons a single source's extraction is abandoned.
///
/// Every variant means the source produced no data; callers never see a
/// partially scanned set.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The credential bundle could not be read or applied
    #[error("credentials unavailable for {url}: {reason}")]
    CredentialsUnavailable {
        /// Source being extracted
        url: String,
        /// Why the bundle was unusable
        reason: String,
    },

    /// The site showed its sign-in page after the bundle was restored
    #[error("credentials rejected for {url}: sign-in page shown after restore")]
    CredentialsRejected {
        /// Source being extracted
        url: String,
    },

    /// Content never appeared within the retry budget
    #[error("navigation to {url} timed out after {attempts} attempts")]
    NavigationTimeout {
        /// Source being extracted
        url: String,
        /// Navigations made, including the first
        attempts: u32,
    },

    /// A captcha frame was rendered
    #[error("anti-automation challenge detected on {url}")]
    ChallengeDetected {
        /// Source being extracted
        url: String,
    },

    /// Lower-level browser failure
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),
}

/// Result alias for extraction.
pub type Result<T> = std::result::Result<T, ScanError>;
