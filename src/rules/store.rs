//! Per-bot moderation rule storage (in-memory).

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Criterion;
use crate::bot::BotId;
use crate::error::{BotflyError, Result};

/// A moderation directive: reply automatically when a message in
/// `group_id` satisfies `criterion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Target chat id, in the platform's string form.
    pub group_id: String,

    /// Matching predicate tag.
    pub criterion: Criterion,

    /// Optional criterion parameter ("" when unused).
    #[serde(default)]
    pub value: String,
}

impl Rule {
    /// Create a rule; the group id is trimmed and a `None` value becomes "".
    pub fn new(
        group_id: impl Into<String>,
        criterion: impl Into<Criterion>,
        value: Option<String>,
    ) -> Self {
        Self {
            group_id: group_id.into().trim().to_string(),
            criterion: criterion.into(),
            value: value.unwrap_or_default(),
        }
    }

    /// Reject rules without a group id or criterion.
    pub fn validate(&self) -> Result<()> {
        if self.group_id.trim().is_empty() {
            return Err(BotflyError::InvalidRule("groupId is required".into()));
        }
        if self.criterion.is_blank() {
            return Err(BotflyError::InvalidRule("criterion is required".into()));
        }
        Ok(())
    }

    /// Tuple equality used by removal.
    fn same_tuple(&self, other: &Rule) -> bool {
        self.group_id == other.group_id
            && self.criterion == other.criterion
            && self.value == other.value
    }
}

/// Ordered rule lists keyed by bot.
///
/// Cloning is cheap and shares the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Arc<DashMap<BotId, Vec<Rule>>>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; duplicates are allowed.
    ///
    /// Returns the updated rule list.
    pub fn add(&self, bot_id: &BotId, rule: Rule) -> Result<Vec<Rule>> {
        rule.validate()?;

        let mut rules = self.rules.entry(bot_id.clone()).or_default();
        debug!(
            "Adding rule for bot {}: group={} criterion={}",
            bot_id, rule.group_id, rule.criterion
        );
        rules.push(rule);
        Ok(rules.clone())
    }

    /// Remove every rule whose (group, criterion, value) tuple equals `rule`.
    ///
    /// Returns the updated rule list, unchanged if nothing matched.
    pub fn remove(&self, bot_id: &BotId, rule: &Rule) -> Result<Vec<Rule>> {
        rule.validate()?;

        let Some(mut rules) = self.rules.get_mut(bot_id) else {
            return Ok(Vec::new());
        };

        let before = rules.len();
        rules.retain(|r| !r.same_tuple(rule));
        debug!(
            "Removed {} rule(s) for bot {}: group={} criterion={}",
            before - rules.len(),
            bot_id,
            rule.group_id,
            rule.criterion
        );
        Ok(rules.clone())
    }

    /// Snapshot of a bot's rules in insertion order (empty if unknown).
    pub fn list(&self, bot_id: &BotId) -> Vec<Rule> {
        self.rules
            .get(bot_id)
            .map(|rules| rules.clone())
            .unwrap_or_default()
    }

    /// Rules targeting one chat, in insertion order.
    pub fn for_chat(&self, bot_id: &BotId, chat_id: &str) -> Vec<Rule> {
        self.rules
            .get(bot_id)
            .map(|rules| {
                rules
                    .iter()
                    .filter(|r| r.group_id == chat_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
