//! Rollcall Core - Foundation crate for the Rollcall thread auditor.
//!
//! This crate provides shared types, error handling and configuration
//! management that all other Rollcall crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes (`Identity`, `IdentitySet`, `IgnoreSet`, `Source`)
//!
//! # Example
//!
//! ```rust
//! use rollcall_core::{AppConfig, Identity, IdentitySet};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.general.identity_prefix, "@");
//!
//! let mut seen = IdentitySet::new();
//! seen.insert(Identity::new("@alice"));
//! assert!(!seen.insert(Identity::new("@alice")));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, GeneralConfig, Jitter, ScanningConfig, TransportConfig};
pub use error::{ConfigError, ConfigResult, Result, RollcallError};
pub use types::{is_valid_url, Identity, IdentitySet, IgnoreSet, Source, SourceRole};
