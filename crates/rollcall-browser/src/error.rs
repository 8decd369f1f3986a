use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("element not interactable: {0}")]
    NotInteractable(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("credential bundle error: {0}")]
    AuthBundle(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BrowserError {
    /// Whether waiting longer could make the operation succeed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
