//! Browser session layer for Rollcall.
//!
//! Owns the single headless Chromium session, restores and persists its
//! credentials, and exposes rendered content through the [`PageActions`]
//! capability that the extraction pipeline is written against.

pub mod actions;
pub mod auth;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod session;

pub use actions::PageActions;
pub use auth::AuthEntry;
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
pub use session::{persist_auth_state, restore_auth_state, SessionManager};
