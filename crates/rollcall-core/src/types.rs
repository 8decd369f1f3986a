//! Shared types used across the Rollcall workspace.
//!
//! This module defines the identity and source newtypes that flow from the
//! extraction pipeline into the verification engine.

use crate::error::RollcallError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// A participant handle as rendered on the page, e.g. `@alice`.
///
/// Identities are compared by exact, case-sensitive string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap a handle string without further validation.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Find every `@word` token in free-form text, in order of appearance.
    #[must_use]
    pub fn tokens_in(text: &str) -> Vec<Self> {
        static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = TOKEN_REGEX.get_or_init(|| Regex::new(r"@\w+").expect("valid regex"));

        regex
            .find_iter(text)
            .map(|m| Self(m.as_str().to_string()))
            .collect()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Insertion-ordered set of identities produced by one extraction run.
///
/// Membership is exact string equality; iteration yields identities in order
/// of first discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Identity>", into = "Vec<Identity>")]
pub struct IdentitySet {
    order: Vec<Identity>,
    members: HashSet<Identity>,
}

impl IdentitySet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an identity. Returns `true` if it was not already present.
    pub fn insert(&mut self, identity: Identity) -> bool {
        if self.members.contains(&identity) {
            return false;
        }
        self.members.insert(identity.clone());
        self.order.push(identity);
        true
    }

    /// Check membership by exact string match.
    #[must_use]
    pub fn contains(&self, identity: &Identity) -> bool {
        self.members.contains(identity)
    }

    /// Number of distinct identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the set has no identities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate in order of first discovery.
    pub fn iter(&self) -> std::slice::Iter<'_, Identity> {
        self.order.iter()
    }

    /// Drop every identity listed in the ignore set, keeping order.
    #[must_use]
    pub fn without_ignored(mut self, ignored: &IgnoreSet) -> Self {
        self.order.retain(|id| !ignored.contains(id));
        self.members.retain(|id| !ignored.contains(id));
        self
    }
}

impl From<Vec<Identity>> for IdentitySet {
    fn from(identities: Vec<Identity>) -> Self {
        identities.into_iter().collect()
    }
}

impl From<IdentitySet> for Vec<Identity> {
    fn from(set: IdentitySet) -> Self {
        set.order
    }
}

impl FromIterator<Identity> for IdentitySet {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        let mut set = Self::new();
        for identity in iter {
            set.insert(identity);
        }
        set
    }
}

impl Extend<Identity> for IdentitySet {
    fn extend<I: IntoIterator<Item = Identity>>(&mut self, iter: I) {
        for identity in iter {
            self.insert(identity);
        }
    }
}

impl<'a> IntoIterator for &'a IdentitySet {
    type Item = &'a Identity;
    type IntoIter = std::slice::Iter<'a, Identity>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

/// Process-lifetime set of identities excluded from every extraction result.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet(IdentitySet);

impl IgnoreSet {
    /// Create an empty ignore set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add identities, returning the ones that were newly added.
    pub fn add(&mut self, identities: impl IntoIterator<Item = Identity>) -> Vec<Identity> {
        identities
            .into_iter()
            .filter(|id| self.0.insert(id.clone()))
            .collect()
    }

    /// Remove every identity.
    pub fn clear(&mut self) {
        self.0 = IdentitySet::new();
    }

    /// Check membership.
    #[must_use]
    pub fn contains(&self, identity: &Identity) -> bool {
        self.0.contains(identity)
    }

    /// Whether nothing is ignored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Identity> {
        self.0.iter()
    }
}

/// Role a source plays in a verification job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRole {
    /// The thread whose participants are audited.
    Primary,
    /// The i-th verification thread, numbered from 1.
    Secondary(usize),
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary(index) => write!(f, "secondary#{index}"),
        }
    }
}

/// A document location contributing one identity set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    url: String,
    role: SourceRole,
}

impl Source {
    /// Create a source after validating the URL.
    ///
    /// # Errors
    /// Returns error if the text is not a single absolute http(s) URL.
    pub fn new(url: &str, role: SourceRole) -> Result<Self, RollcallError> {
        let url = url.trim();
        if !is_valid_url(url) {
            return Err(RollcallError::InvalidSource(url.to_string()));
        }
        Ok(Self {
            url: url.to_string(),
            role,
        })
    }

    /// The document URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The role tag.
    #[must_use]
    pub fn role(&self) -> SourceRole {
        self.role
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.url, self.role)
    }
}

/// Check that text is one absolute http(s) URL with no whitespace.
#[must_use]
pub fn is_valid_url(text: &str) -> bool {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = URL_REGEX.get_or_init(|| Regex::new(r"^https?://\S+$").expect("valid regex"));

    let text = text.trim();
    regex.is_match(text) && url::Url::parse(text).is_ok()
}
