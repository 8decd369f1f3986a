//! Identity extraction from rendered replies.
//!
//! Several independent queries are run on every pass because different reply
//! layouts match different queries. A query that fails is skipped; it never
//! aborts the pass.

use crate::selectors;
use rollcall_browser::PageActions;
use rollcall_core::{GeneralConfig, Identity, IdentitySet};

/// What part of the markup a strategy keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// `data-testid` attributes
    Attribute,
    /// ARIA roles
    Role,
    /// Fragments of generated class names
    ClassFragment,
    /// Bare text containing the prefix
    Text,
}

/// One query in the ordered fallback list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanStrategy {
    /// Label used in logs
    pub name: &'static str,
    /// What the query keys on
    pub kind: StrategyKind,
    /// Query returning elements whose text may be a handle
    pub xpath: String,
}

impl ScanStrategy {
    /// Build a strategy from its parts.
    pub fn new(name: &'static str, kind: StrategyKind, xpath: impl Into<String>) -> Self {
        Self {
            name,
            kind,
            xpath: xpath.into(),
        }
    }
}

/// The default strategies, in priority order.
pub fn default_strategies() -> Vec<ScanStrategy> {
    vec![
        ScanStrategy::new("user-name-span", StrategyKind::Attribute, selectors::USER_NAME_SPAN),
        ScanStrategy::new(
            "avatar-sibling-span",
            StrategyKind::Attribute,
            selectors::AVATAR_SIBLING_SPAN,
        ),
        ScanStrategy::new(
            "avatar-sibling-link",
            StrategyKind::Attribute,
            selectors::AVATAR_SIBLING_LINK,
        ),
        ScanStrategy::new("role-link", StrategyKind::Role, selectors::ROLE_LINK),
        ScanStrategy::new(
            "class-user-name-span",
            StrategyKind::ClassFragment,
            selectors::CLASS_USER_NAME_SPAN,
        ),
        ScanStrategy::new("any-handle-span", StrategyKind::Text, selectors::ANY_HANDLE_SPAN),
    ]
}

/// Decides whether a piece of rendered text is a participant identity.
#[derive(Debug, Clone)]
pub struct IdentityFilter {
    prefix: String,
    operator: Option<Identity>,
}

impl IdentityFilter {
    /// Filter accepting `prefix`-led tokens, minus `operator` if given.
    pub fn new(prefix: impl Into<String>, operator: Option<&str>) -> Self {
        Self {
            prefix: prefix.into(),
            operator: operator.map(Identity::new),
        }
    }

    /// Filter built from the `general` config section.
    pub fn from_config(general: &GeneralConfig) -> Self {
        Self::new(
            general.identity_prefix.clone(),
            general.operator_handle.as_deref(),
        )
    }

    /// Trim `raw` and accept it if it is a prefixed handle other than the operator's.
    pub fn accept(&self, raw: &str) -> Option<Identity> {
        accept_identity(raw, &self.prefix, self.operator.as_ref())
    }
}

/// Acceptance rule shared by every strategy.
///
/// The trimmed text must start with `prefix`, carry something after it, and
/// differ from `operator`.
pub fn accept_identity(raw: &str, prefix: &str, operator: Option<&Identity>) -> Option<Identity> {
    let text = raw.trim();
    if !text.starts_with(prefix) || text.len() == prefix.len() {
        return None;
    }

    let identity = Identity::new(text);
    if operator == Some(&identity) {
        return None;
    }
    Some(identity)
}

/// Reads identities out of the currently rendered content.
#[derive(Debug, Clone)]
pub struct Extractor {
    filter: IdentityFilter,
    strategies: Vec<ScanStrategy>,
}

impl Extractor {
    /// Extractor running [`default_strategies`].
    pub fn new(filter: IdentityFilter) -> Self {
        Self::with_strategies(filter, default_strategies())
    }

    /// Extractor running a custom strategy list, in the order given.
    pub fn with_strategies(filter: IdentityFilter, strategies: Vec<ScanStrategy>) -> Self {
        Self { filter, strategies }
    }

    /// Strategies in priority order.
    pub fn strategies(&self) -> &[ScanStrategy] {
        &self.strategies
    }

    /// Run every strategy against the page and merge accepted identities
    /// into `seen`. Returns how many were new.
    pub async fn scan<P: PageActions + ?Sized>(&self, page: &P, seen: &mut IdentitySet) -> usize {
        let before = seen.len();

        for strategy in &self.strategies {
            let texts = match page.xpath_texts(&strategy.xpath).await {
                Ok(texts) => texts,
                Err(e) => {
                    tracing::debug!("Strategy {} skipped: {}", strategy.name, e);
                    continue;
                }
            };

            let matched = texts.len();
            let added = texts
                .iter()
                .filter_map(|text| self.filter.accept(text))
                .filter(|identity| seen.insert(identity.clone()))
                .count();
            tracing::trace!(
                "Strategy {} matched {} nodes, {} new identities",
                strategy.name,
                matched,
                added
            );
        }

        let added = seen.len() - before;
        tracing::debug!(
            "Scan pass added {} identities ({} unique so far)",
            added,
            seen.len()
        );
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_trimmed_prefixed_handles() {
        let filter = IdentityFilter::new("@", None);
        assert_eq!(filter.accept("  @alice \n"), Some(Identity::new("@alice")));
        assert_eq!(filter.accept("alice@example.com"), None);
        assert_eq!(filter.accept("Alice"), None);
        assert_eq!(filter.accept("@"), None);
        assert_eq!(filter.accept("   "), None);
    }

    #[test]
    fn test_rejects_operator_identity() {
        let filter = IdentityFilter::new("@", Some("@host"));
        assert_eq!(filter.accept("@host"), None);
        assert_eq!(filter.accept("@Host"), Some(Identity::new("@Host")));
    }

    #[test]
    fn test_accept_identity_with_custom_prefix() {
        let operator = Identity::new("#ops");
        assert_eq!(accept_identity("#team", "#", Some(&operator)), Some(Identity::new("#team")));
        assert_eq!(accept_identity("#ops", "#", Some(&operator)), None);
        assert_eq!(accept_identity("@team", "#", None), None);
    }

    #[test]
    fn test_filter_from_config() {
        let general = GeneralConfig {
            operator_handle: Some("@me".to_string()),
            identity_prefix: "@".to_string(),
        };
        let filter = IdentityFilter::from_config(&general);
        assert_eq!(filter.accept("@me"), None);
        assert!(filter.accept("@you").is_some());
    }

    #[test]
    fn test_default_strategy_order() {
        let kinds: Vec<StrategyKind> = default_strategies().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StrategyKind::Attribute,
                StrategyKind::Attribute,
                StrategyKind::Attribute,
                StrategyKind::Role,
                StrategyKind::ClassFragment,
                StrategyKind::Text,
            ]
        );
    }
}
