//! Application state management.

use rollcall_core::{IdentitySet, IgnoreSet, TransportConfig};
use rollcall_verify::{build_matrix, PresenceMatrix};
use std::fmt;
use uuid::Uuid;

/// Where the current job is in its input sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStep {
    /// No job in progress
    #[default]
    Idle,
    /// Waiting for the primary thread link
    AwaitingPrimaryLink,
    /// Waiting for the number of verification links
    AwaitingVerificationCount,
    /// Waiting for the comma-separated verification links
    AwaitingVerificationLinks,
}

impl fmt::Display for JobStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingPrimaryLink => "awaiting-primary-link",
            Self::AwaitingVerificationCount => "awaiting-verification-count",
            Self::AwaitingVerificationLinks => "awaiting-verification-links",
        };
        f.write_str(name)
    }
}

/// Accumulated results of one verification job.
#[derive(Debug, Clone)]
pub struct VerificationJob {
    /// Correlates log lines for this job
    pub id: Uuid,
    /// Identities from the primary thread, once extracted
    pub primary: Option<IdentitySet>,
    /// One slot per verification link; `None` until that link is scanned
    pub secondaries: Vec<Option<IdentitySet>>,
    /// Current input step
    pub step: JobStep,
    /// Last rendered summary
    pub summary_text: String,
}

impl Default for VerificationJob {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            primary: None,
            secondaries: Vec::new(),
            step: JobStep::Idle,
            summary_text: String::new(),
        }
    }
}

impl VerificationJob {
    /// A fresh job waiting for its primary link.
    #[must_use]
    pub fn begin() -> Self {
        Self {
            step: JobStep::AwaitingPrimaryLink,
            ..Self::default()
        }
    }

    /// Prepare `count` empty verification slots.
    pub fn open_slots(&mut self, count: usize) {
        self.secondaries = vec![None; count];
    }

    /// Mark every verification slot as not yet scanned.
    pub fn clear_slots(&mut self) {
        for slot in &mut self.secondaries {
            *slot = None;
        }
    }

    /// Whether slots are open and every one of them has been scanned.
    #[must_use]
    pub fn verification_complete(&self) -> bool {
        !self.secondaries.is_empty() && self.secondaries.iter().all(Option::is_some)
    }

    /// Secondary sets in slot order, once every slot is scanned.
    #[must_use]
    pub fn secondary_sets(&self) -> Option<Vec<IdentitySet>> {
        if !self.verification_complete() {
            return None;
        }
        self.secondaries.iter().cloned().collect()
    }

    /// Presence matrix, if the primary and every secondary have been scanned.
    #[must_use]
    pub fn matrix(&self) -> Option<PresenceMatrix> {
        let primary = self.primary.as_ref()?;
        let secondaries = self.secondary_sets()?;
        Some(build_matrix(primary, &secondaries))
    }
}

/// Everything the command layer mutates.
#[derive(Debug)]
pub struct AppState {
    /// The current job
    pub job: VerificationJob,
    /// Identities dropped from every extraction; survives job resets
    pub ignored: IgnoreSet,
    /// Largest verification count a job accepts
    pub max_verification_links: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            job: VerificationJob::default(),
            ignored: IgnoreSet::default(),
            max_verification_links: TransportConfig::default().max_verification_links,
        }
    }
}

impl AppState {
    /// Create empty state with no job in progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the current job, keeping the ignore set.
    pub fn reset_job(&mut self) {
        self.job = VerificationJob::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::Identity;

    #[test]
    fn test_new_state_is_idle() {
        let state = AppState::new();
        assert_eq!(state.job.step, JobStep::Idle);
        assert!(state.job.primary.is_none());
        assert!(state.job.matrix().is_none());
    }

    #[test]
    fn test_begin_assigns_fresh_id() {
        let first = VerificationJob::begin();
        let second = VerificationJob::begin();
        assert_eq!(first.step, JobStep::AwaitingPrimaryLink);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_unscanned_slots_are_distinct_from_empty() {
        let mut job = VerificationJob::begin();
        job.open_slots(2);
        job.secondaries[0] = Some(IdentitySet::new());

        assert!(job.secondaries[0].is_some());
        assert!(job.secondaries[1].is_none());
        assert!(job.secondary_sets().is_none());

        job.secondaries[1] = Some(IdentitySet::new());
        assert_eq!(job.secondary_sets().map(|sets| sets.len()), Some(2));

        job.clear_slots();
        assert!(job.secondaries.iter().all(Option::is_none));
    }

    #[test]
    fn test_matrix_requires_every_slot_scanned() {
        let mut job = VerificationJob::begin();
        job.primary = Some([Identity::new("@a")].into_iter().collect());
        assert!(job.matrix().is_none());

        job.open_slots(2);
        job.secondaries[0] = Some([Identity::new("@a")].into_iter().collect());
        assert!(!job.verification_complete());
        assert!(job.matrix().is_none());

        job.secondaries[1] = Some(IdentitySet::new());
        let matrix = job.matrix().expect("all slots scanned");
        assert_eq!(matrix.secondary_count(), 2);
    }

    #[test]
    fn test_reset_keeps_ignore_set() {
        let mut state = AppState::new();
        state.ignored.add([Identity::new("@spam")]);
        state.job = VerificationJob::begin();

        state.reset_job();
        assert_eq!(state.job.step, JobStep::Idle);
        assert!(state.ignored.contains(&Identity::new("@spam")));
    }
}
