//! Policy rule module - pattern-to-trust-level mappings
//!
//! Rules are evaluated in creation order and the first matching rule wins.
//! Later rules are never consulted once an earlier one matches, even when
//! they are more specific. Creation order encodes operator intent in the
//! order it was declared; resolution must not be reordered by specificity.

use crate::pattern;
use crate::trust::TrustLevel;

/// A single trust policy rule
///
/// Patterns are unique: adding a rule with an existing pattern replaces its
/// trust level in place rather than creating a duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    /// Glob-style pattern matched against a record's source string
    pub pattern: String,

    /// Trust level assigned when the pattern matches
    pub trust_level: TrustLevel,

    /// Timestamp the rule was first created (seconds since Unix epoch).
    /// Used as a display tie-break only, never for match precedence.
    pub created_at: u64,
}

impl PolicyRule {
    /// Create a new policy rule
    pub fn new(pattern: impl Into<String>, trust_level: TrustLevel, created_at: u64) -> Self {
        Self {
            pattern: pattern.into(),
            trust_level,
            created_at,
        }
    }

    /// Return true if this rule's pattern matches the given source
    pub fn matches(&self, source: &str) -> bool {
        pattern::matches(&self.pattern, source)
    }
}

/// Resolve a source string against an ordered rule set
///
/// `rules` must already be in creation order (the store guarantees this).
/// Returns the first matching rule, or `None` when no rule matches.
pub fn resolve<'a>(rules: &'a [PolicyRule], source: &str) -> Option<&'a PolicyRule> {
    rules.iter().find(|rule| rule.matches(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let rules = vec![
            PolicyRule::new("a:*", TrustLevel::Trusted, 100),
            PolicyRule::new("a:b*", TrustLevel::Untrusted, 200),
        ];

        // The earlier, less specific rule wins
        let matched = resolve(&rules, "a:b1").unwrap();
        assert_eq!(matched.pattern, "a:*");
        assert_eq!(matched.trust_level, TrustLevel::Trusted);
    }

    #[test]
    fn test_later_rule_reached_when_earlier_misses() {
        let rules = vec![
            PolicyRule::new("internal:*", TrustLevel::Trusted, 100),
            PolicyRule::new("web:*", TrustLevel::Untrusted, 200),
        ];

        let matched = resolve(&rules, "web:scraper").unwrap();
        assert_eq!(matched.pattern, "web:*");
        assert_eq!(matched.trust_level, TrustLevel::Untrusted);
    }

    #[test]
    fn test_no_match() {
        let rules = vec![PolicyRule::new("internal:*", TrustLevel::Trusted, 100)];
        assert!(resolve(&rules, "external:feed").is_none());
        assert!(resolve(&[], "anything").is_none());
    }

    #[test]
    fn test_exact_pattern() {
        let rules = vec![PolicyRule::new("system:boot", TrustLevel::Trusted, 100)];
        assert!(resolve(&rules, "system:boot").is_some());
        assert!(resolve(&rules, "system:bootloader").is_none());
    }
}
