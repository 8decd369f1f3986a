//! User-facing notices for failed commands.

use rollcall_scanner::ScanError;
use serde::Serialize;
use std::fmt;

/// A failure rendered for the person who sent the command.
///
/// Never carries raw error text; the underlying error is logged instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandError {
    /// Stable failure class (e.g., "CREDENTIALS_REJECTED")
    pub code: String,
    /// User-friendly message
    pub message: String,
}

impl CommandError {
    /// Create a new command error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Append which link the failure concerns.
    #[must_use]
    pub fn for_link(mut self, position: usize, link: &str) -> Self {
        self.message = format!("{} (link {position}: '{link}')", self.message);
        self
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Convert ScanError to CommandError, one notice per failure class.
impl From<ScanError> for CommandError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::CredentialsUnavailable { .. } => Self::new(
                "CREDENTIALS_UNAVAILABLE",
                "Could not load saved credentials. Ensure credentials are valid.",
            ),
            ScanError::CredentialsRejected { .. } => Self::new(
                "CREDENTIALS_REJECTED",
                "The site asked to sign in again. Ensure credentials are valid.",
            ),
            ScanError::NavigationTimeout { attempts, .. } => Self::new(
                "NAVIGATION_TIMEOUT",
                format!("The link did not load after {attempts} attempts. Try again later."),
            ),
            ScanError::ChallengeDetected { .. } => Self::new(
                "CHALLENGE_DETECTED",
                "The site showed a captcha. Solve it in a browser or try again later.",
            ),
            ScanError::Browser(_) => Self::new(
                "BROWSER_ERROR",
                "The browser session failed. Try again.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_browser::BrowserError;

    #[test]
    fn test_each_failure_class_has_its_own_code() {
        let errors = vec![
            ScanError::CredentialsUnavailable {
                url: "u".to_string(),
                reason: "missing file".to_string(),
            },
            ScanError::CredentialsRejected { url: "u".to_string() },
            ScanError::NavigationTimeout {
                url: "u".to_string(),
                attempts: 4,
            },
            ScanError::ChallengeDetected { url: "u".to_string() },
            ScanError::Browser(BrowserError::Script("secret detail".to_string())),
        ];

        let notices: Vec<CommandError> = errors.into_iter().map(CommandError::from).collect();
        let mut codes: Vec<&str> = notices.iter().map(|n| n.code.as_str()).collect();
        codes.dedup();
        assert_eq!(codes.len(), 5);
        assert!(notices.iter().all(|n| !n.message.contains("secret detail")));
        assert!(notices[2].message.contains("4 attempts"));
    }

    #[test]
    fn test_for_link_names_the_link() {
        let notice = CommandError::new("X", "Failed.").for_link(2, "https://x.com/b/status/2");
        assert_eq!(notice.to_string(), "Failed. (link 2: 'https://x.com/b/status/2')");
    }
}
