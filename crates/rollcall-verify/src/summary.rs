//! Compliance summary over a presence matrix.

use crate::matrix::PresenceMatrix;
use rollcall_core::{Identity, IdentitySet};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Identities that missed the same number of secondaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissGroup {
    /// Secondaries missed by every member
    pub miss_count: usize,
    /// Members in primary order
    pub identities: Vec<Identity>,
}

/// Outcome of checking primary participants against the secondaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceSummary {
    /// Primary participants
    pub total: usize,
    /// Participants absent from at least one secondary
    pub non_compliant: usize,
    /// Share of compliant participants, rounded to two decimals
    pub compliance_percentage: f64,
    /// Non-compliant participants, highest miss count first
    pub groups: Vec<MissGroup>,
}

/// Summarize `matrix`, which must have been built from `primary`.
#[must_use]
pub fn summarize(primary: &IdentitySet, matrix: &PresenceMatrix) -> ComplianceSummary {
    let mut by_misses: BTreeMap<usize, Vec<Identity>> = BTreeMap::new();
    for row in matrix.rows() {
        let misses = row.miss_count();
        if misses > 0 {
            by_misses
                .entry(misses)
                .or_default()
                .push(row.identity.clone());
        }
    }

    let total = primary.len();
    let non_compliant = by_misses.values().map(Vec::len).sum();
    let groups = by_misses
        .into_iter()
        .rev()
        .map(|(miss_count, identities)| MissGroup {
            miss_count,
            identities,
        })
        .collect();

    ComplianceSummary {
        total,
        non_compliant,
        compliance_percentage: compliance_percentage(total, non_compliant),
        groups,
    }
}

#[allow(clippy::cast_precision_loss)]
fn compliance_percentage(total: usize, non_compliant: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = 100.0 * (total - non_compliant) as f64 / total as f64;
    (raw * 100.0).round() / 100.0
}

/// Two decimals at most, with trailing zeros dropped down to one.
fn format_percentage(value: f64, total: usize) -> String {
    if total == 0 {
        return "0".to_string();
    }
    let text = format!("{value:.2}");
    let trimmed = text.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}

impl fmt::Display for ComplianceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total count in main thread: {}", self.total)?;
        writeln!(f, "Total Scammers Count: {}", self.non_compliant)?;
        writeln!(
            f,
            "Output Percentage: {}%",
            format_percentage(self.compliance_percentage, self.total)
        )?;
        writeln!(f)?;

        if self.groups.is_empty() {
            return write!(f, "No scammers found (all users fully verified).");
        }

        let blocks: Vec<String> = self
            .groups
            .iter()
            .map(|group| {
                let members: Vec<&str> = group.identities.iter().map(Identity::as_str).collect();
                format!("{} links missed by:\n{}", group.miss_count, members.join("\n"))
            })
            .collect();
        write!(f, "{}", blocks.join("\n\n"))
    }
}
