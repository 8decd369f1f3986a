//! Rollcall Application Shell
//!
//! This is the thin application shell that parses commands, guards them and
//! manages the verification job. Core business logic lives in the `crates/`
//! directory.

pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod guard;
pub mod reply;
pub mod state;

pub use commands::Command;
pub use dispatcher::Dispatcher;
pub use error::CommandError;
pub use extractor::{BrowserExtractor, SourceExtractor};
pub use guard::{guard, Actor, Authorizer, Channel, MessageContext, StaticAuthorizer, ADMINS_ONLY};
pub use reply::Reply;
pub use state::{AppState, JobStep, VerificationJob};

/// Initialize tracing subscriber for logging
///
/// Logs go to stderr so replies on stdout stay clean.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,rollcall=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
