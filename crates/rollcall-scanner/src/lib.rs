//! Rollcall Scanner - Reply extraction for discussion threads.
//!
//! This crate turns a thread URL into the set of identities that replied to
//! it. It drives any [`PageActions`](rollcall_browser::PageActions)
//! implementation through authentication, navigation, expansion of collapsed
//! replies and incremental scrolling, with retry logic, captcha detection and
//! rate limit handling.
//!
//! # Features
//!
//! - Ordered extraction strategies that never short-circuit
//! - Bounded expansion of "show more" affordances
//! - Scroll-until-stable loading with a final top-of-page scan
//! - Navigation retries with exponential backoff
//! - Captcha detection and throttling cooldown
//!
//! # Example
//!
//! ```rust,ignore
//! use rollcall_browser::SessionManager;
//! use rollcall_core::{AppConfig, Source, SourceRole};
//! use rollcall_scanner::ExtractionPipeline;
//!
//! let config = AppConfig::load()?;
//! let mut session = SessionManager::new(config.browser.clone());
//! let pipeline = ExtractionPipeline::new(&config);
//!
//! let source = Source::new("https://x.com/someone/status/1", SourceRole::Primary)?;
//! let identities = pipeline.extract(session.acquire().await?, &source).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod extractor;
pub mod loader;
pub mod orchestrator;
pub mod revealer;
pub mod selectors;
pub mod timing;

// Re-export commonly used types
pub use error::{Result, ScanError};
pub use extractor::{
    accept_identity, default_strategies, Extractor, IdentityFilter, ScanStrategy, StrategyKind,
};
pub use loader::IncrementalLoader;
pub use orchestrator::{ExtractionPipeline, SourceStage};
pub use revealer::{RevealReport, RevealStop, Revealer};
