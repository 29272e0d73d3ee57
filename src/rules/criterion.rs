//! Rule criteria and the registry that evaluates them.
//!
//! A criterion is a tag stored on every rule. The [`CriterionRegistry`]
//! maps tags to a match predicate and a reply builder, so adding a new
//! criterion means registering one more entry instead of touching the
//! dispatcher.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Reply sent when a message starts with a digit.
pub const STARTS_WITH_NUMBER_REPLY: &str = "Message starts with a number!";

/// Reply sent when a message contains the check mark glyph.
pub const CONTAINS_CHECKMARK_REPLY: &str = "Message contains a check mark!";

const CHECKMARK: char = '✅';

/// Matching predicate tag of a rule.
///
/// Unknown tags are kept verbatim in [`Criterion::Other`] so rules created
/// for criteria this build does not know survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Criterion {
    /// First character of the text is an ASCII digit.
    StartsWithNumber,
    /// Text contains "✅".
    ContainsCheckmark,
    /// Any other tag.
    Other(String),
}

impl Criterion {
    pub fn as_str(&self) -> &str {
        match self {
            Self::StartsWithNumber => "startsWithNumber",
            Self::ContainsCheckmark => "containsCheckmark",
            Self::Other(tag) => tag,
        }
    }

    /// True when the tag carries no name at all.
    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

impl From<&str> for Criterion {
    fn from(tag: &str) -> Self {
        match tag.trim() {
            "startsWithNumber" => Self::StartsWithNumber,
            "containsCheckmark" => Self::ContainsCheckmark,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Criterion {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<Criterion> for String {
    fn from(criterion: Criterion) -> Self {
        criterion.as_str().to_string()
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Predicate = dyn Fn(&str, &str) -> bool + Send + Sync;
type ReplyBuilder = dyn Fn(&str, &str) -> String + Send + Sync;

/// Predicate and reply for one criterion.
///
/// Both closures receive `(message_text, rule_value)`.
#[derive(Clone)]
struct Matcher {
    predicate: Arc<Predicate>,
    reply: Arc<ReplyBuilder>,
}

/// Lookup table from criterion to its matcher.
#[derive(Clone)]
pub struct CriterionRegistry {
    matchers: HashMap<Criterion, Matcher>,
}

impl CriterionRegistry {
    /// Registry with no criteria at all.
    pub fn empty() -> Self {
        Self {
            matchers: HashMap::new(),
        }
    }

    /// Registry with the built-in criteria.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();

        registry.register(
            Criterion::StartsWithNumber,
            |text, _| text.chars().next().is_some_and(|c| c.is_ascii_digit()),
            |_, _| STARTS_WITH_NUMBER_REPLY.to_string(),
        );

        registry.register(
            Criterion::ContainsCheckmark,
            |text, _| text.contains(CHECKMARK),
            |_, _| CONTAINS_CHECKMARK_REPLY.to_string(),
        );

        registry
    }

    /// Register (or replace) the matcher for a criterion.
    pub fn register<P, R>(&mut self, criterion: Criterion, predicate: P, reply: R)
    where
        P: Fn(&str, &str) -> bool + Send + Sync + 'static,
        R: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.matchers.insert(
            criterion,
            Matcher {
                predicate: Arc::new(predicate),
                reply: Arc::new(reply),
            },
        );
    }

    /// Check if a criterion has a matcher.
    pub fn contains(&self, criterion: &Criterion) -> bool {
        self.matchers.contains_key(criterion)
    }

    /// Evaluate a criterion against a message.
    ///
    /// Returns the reply text when it matches, `None` when it does not or
    /// when the criterion is not registered.
    pub fn evaluate(&self, criterion: &Criterion, text: &str, value: &str) -> Option<String> {
        let matcher = self.matchers.get(criterion)?;
        (matcher.predicate)(text, value).then(|| (matcher.reply)(text, value))
    }
}

impl Default for CriterionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for CriterionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.matchers.keys().map(Criterion::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("CriterionRegistry")
            .field("criteria", &tags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_parse_to_builtins() {
        assert_eq!(Criterion::from("startsWithNumber"), Criterion::StartsWithNumber);
        assert_eq!(Criterion::from("containsCheckmark"), Criterion::ContainsCheckmark);
        assert_eq!(
            Criterion::from("containsLink"),
            Criterion::Other("containsLink".to_string())
        );
    }

    #[test]
    fn test_criterion_serializes_as_tag() {
        let json = serde_json::to_string(&Criterion::StartsWithNumber).unwrap();
        assert_eq!(json, "\"startsWithNumber\"");

        let parsed: Criterion = serde_json::from_str("\"shouting\"").unwrap();
        assert_eq!(parsed, Criterion::Other("shouting".to_string()));
    }

    #[test]
    fn test_starts_with_number() {
        let registry = CriterionRegistry::default();
        let c = Criterion::StartsWithNumber;

        assert_eq!(
            registry.evaluate(&c, "5 apples", "").as_deref(),
            Some(STARTS_WITH_NUMBER_REPLY)
        );
        assert_eq!(registry.evaluate(&c, "apples 5", ""), None);
        assert_eq!(registry.evaluate(&c, "", ""), None);
        // Non-ASCII digits do not count.
        assert_eq!(registry.evaluate(&c, "٣ apples", ""), None);
    }

    #[test]
    fn test_contains_checkmark() {
        let registry = CriterionRegistry::default();
        let c = Criterion::ContainsCheckmark;

        assert_eq!(
            registry.evaluate(&c, "done ✅ today", "").as_deref(),
            Some(CONTAINS_CHECKMARK_REPLY)
        );
        assert_eq!(registry.evaluate(&c, "done ✔ today", ""), None);
    }

    #[test]
    fn test_unregistered_criterion_is_noop() {
        let registry = CriterionRegistry::default();
        let c = Criterion::Other("containsLink".to_string());

        assert!(!registry.contains(&c));
        assert_eq!(registry.evaluate(&c, "https://example.com", ""), None);
    }

    #[test]
    fn test_register_custom_criterion_uses_value() {
        let mut registry = CriterionRegistry::default();
        let c = Criterion::from("containsWord");
        registry.register(
            c.clone(),
            |text, value| !value.is_empty() && text.contains(value),
            |_, value| format!("Message mentions {}!", value),
        );

        assert_eq!(
            registry.evaluate(&c, "buy cheap pills", "pills").as_deref(),
            Some("Message mentions pills!")
        );
        assert_eq!(registry.evaluate(&c, "hello", "pills"), None);
        // Built-ins are untouched.
        assert!(registry.contains(&Criterion::StartsWithNumber));
    }
}
