//! Rollcall Verify - Cross-thread presence checks.
//!
//! Given the identities that replied on a primary thread and on each
//! secondary thread, this crate builds a presence matrix, summarizes who
//! missed which threads, and renders both as chat-ready text. Everything here
//! is pure: no I/O and no error states.
//!
//! # Example
//!
//! ```rust
//! use rollcall_core::{Identity, IdentitySet};
//! use rollcall_verify::{build_matrix, summarize};
//!
//! let primary: IdentitySet = ["@a", "@b"].into_iter().map(Identity::new).collect();
//! let secondary: IdentitySet = ["@a"].into_iter().map(Identity::new).collect();
//!
//! let matrix = build_matrix(&primary, &[secondary]);
//! let summary = summarize(&primary, &matrix);
//! assert_eq!(summary.non_compliant, 1);
//! assert!((summary.compliance_percentage - 50.0).abs() < f64::EPSILON);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod matrix;
pub mod report;
pub mod summary;

pub use matrix::{build_matrix, PresenceMatrix, PresenceRow};
pub use report::{chunk_message, link_headers, render_presence_table};
pub use summary::{summarize, ComplianceSummary, MissGroup};
