//! Presence of primary participants across secondary threads.

use rollcall_core::{Identity, IdentitySet};
use serde::Serialize;

/// One primary identity and whether it appears in each secondary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceRow {
    /// The primary participant
    pub identity: Identity,
    /// `present[i]` is true iff the identity replied on secondary `i`
    pub present: Vec<bool>,
}

impl PresenceRow {
    /// Number of secondaries the identity is absent from.
    #[must_use]
    pub fn miss_count(&self) -> usize {
        self.present.iter().filter(|present| !**present).count()
    }
}

/// Rows in primary order, columns in ascending secondary order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PresenceMatrix {
    rows: Vec<PresenceRow>,
    secondary_count: usize,
}

impl PresenceMatrix {
    /// All rows in primary order.
    #[must_use]
    pub fn rows(&self) -> &[PresenceRow] {
        &self.rows
    }

    /// Row for `identity`, if it is a primary participant.
    #[must_use]
    pub fn row(&self, identity: &Identity) -> Option<&PresenceRow> {
        self.rows.iter().find(|row| &row.identity == identity)
    }

    /// Number of secondary columns.
    #[must_use]
    pub fn secondary_count(&self) -> usize {
        self.secondary_count
    }

    /// Whether the primary set was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Mark each primary identity present or absent in every secondary set.
///
/// Membership is exact string equality.
#[must_use]
pub fn build_matrix(primary: &IdentitySet, secondaries: &[IdentitySet]) -> PresenceMatrix {
    let rows = primary
        .iter()
        .map(|identity| PresenceRow {
            identity: identity.clone(),
            present: secondaries
                .iter()
                .map(|secondary| secondary.contains(identity))
                .collect(),
        })
        .collect();

    PresenceMatrix {
        rows,
        secondary_count: secondaries.len(),
    }
}
