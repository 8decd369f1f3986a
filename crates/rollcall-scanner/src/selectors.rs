//! XPath vocabulary for thread pages.
//!
//! The markup of the target site changes often, so every query used by the
//! pipeline is collected here.

/// Scope shared by all reply queries: tweet articles that are neither
/// promoted placements nor part of the trailing "Discover more" feed.
macro_rules! reply_scope {
    ($tail:literal) => {
        concat!(
            r#"//article[@data-testid="tweet" and not(ancestor::*[@data-testid="placementTracking"]) and not(preceding::span[normalize-space(text())="Discover more"])]"#,
            $tail
        )
    };
}

/// Scope for avatar blocks, with the same exclusions as `reply_scope`.
macro_rules! avatar_scope {
    ($tail:literal) => {
        concat!(
            r#"//div[@data-testid="Tweet-User-Avatar" and not(ancestor::*[@data-testid="placementTracking"]) and not(preceding::span[normalize-space(text())="Discover more"])]"#,
            $tail
        )
    };
}

/// Any article, including the main post.
pub const ANY_ARTICLE: &str = "//article";

/// Any tweet article, promoted or not.
pub const TWEET_ARTICLE: &str = r#"//article[@data-testid="tweet"]"#;

/// Top-level reply units used to measure content growth.
pub const REPLY_ARTICLE: &str =
    r#"//article[@data-testid="tweet" and not(ancestor::*[@data-testid="placementTracking"])]"#;

/// Navigation link only rendered for signed-in sessions.
pub const HOME_LINK: &str = r#"//a[contains(@href, "/home")]"#;

/// Sign-in prompt rendered for anonymous sessions.
pub const SIGN_IN_LINK: &str = r#"//a[contains(text(), "Sign in")]"#;

/// Embedded anti-automation challenge.
pub const CAPTCHA_FRAME: &str = r#"//iframe[contains(@src, "captcha")]"#;

/// Throttling notice.
pub const THROTTLE_NOTICE: &str = r#"//div[contains(text(), "Too Many Requests")]"#;

/// Handle spans inside the user-name block of a reply.
pub const USER_NAME_SPAN: &str =
    reply_scope!(r#"//div[@data-testid="User-Name"]//span[contains(text(), "@")]"#);

/// Handle spans next to a reply avatar.
pub const AVATAR_SIBLING_SPAN: &str =
    avatar_scope!(r#"//following-sibling::div//span[contains(text(), "@")]"#);

/// Handle links next to a reply avatar.
pub const AVATAR_SIBLING_LINK: &str =
    avatar_scope!(r#"//following-sibling::div//a[contains(@href, "/") and contains(text(), "@")]"#);

/// Profile links inside a reply.
pub const ROLE_LINK: &str =
    reply_scope!(r#"//a[@role="link" and contains(@href, "/") and contains(text(), "@")]"#);

/// Handle spans inside generated user-name classes.
pub const CLASS_USER_NAME_SPAN: &str = reply_scope!(
    r#"//div[contains(@class, "css-") and contains(@class, "user-name")]//span[contains(text(), "@")]"#
);

/// Any span in a reply that mentions a handle.
pub const ANY_HANDLE_SPAN: &str = reply_scope!(r#"//span[contains(text(), "@")]"#);

/// Labels of the affordances that reveal hidden replies.
pub const EXPANSION_LABELS: [&str; 6] = [
    "Show more replies",
    "Load more",
    "Show",
    "more replies",
    "Show more",
    "View more replies",
];

/// Structural fallback for expansion affordances without a known label.
pub const STRUCTURAL_EXPANSION: &str =
    r#"//div[@role="button" and contains(@class, "css-") and contains(., "more")]"#;

/// A span whose text equals one of the labels exactly.
pub fn exact_label_xpath(labels: &[&str]) -> String {
    let clauses: Vec<String> = labels
        .iter()
        .map(|label| format!(r#"normalize-space(text())="{label}""#))
        .collect();
    format!("//span[{}]", clauses.join(" or "))
}

/// A span whose text contains `label`, ignoring ASCII case.
pub fn label_contains_xpath(label: &str) -> String {
    format!(
        "//span[contains(translate(text(), 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz'), '{}')]",
        label.to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_scope_prefixes_queries() {
        for xpath in [USER_NAME_SPAN, ROLE_LINK, CLASS_USER_NAME_SPAN, ANY_HANDLE_SPAN] {
            assert!(xpath.starts_with(r#"//article[@data-testid="tweet""#));
            assert!(xpath.contains("placementTracking"));
        }
        assert!(AVATAR_SIBLING_SPAN.starts_with(r#"//div[@data-testid="Tweet-User-Avatar""#));
    }

    #[test]
    fn test_exact_label_xpath() {
        assert_eq!(
            exact_label_xpath(&["Load more", "Show"]),
            r#"//span[normalize-space(text())="Load more" or normalize-space(text())="Show"]"#
        );
    }

    #[test]
    fn test_label_contains_is_lowercased() {
        let xpath = label_contains_xpath("Show more replies");
        assert!(xpath.ends_with("'show more replies')]"));
        assert!(xpath.contains("translate(text()"));
    }
}
