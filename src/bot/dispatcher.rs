//! Message dispatcher.
//!
//! Runs logging and rule matching for every inbound text message. The two
//! steps are independent: one never suppresses the other.

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use super::client::{InboundMessage, Replier};
use super::BotId;
use crate::logs::{LogEntry, LogStore};
use crate::rules::{CriterionRegistry, RuleStore};

/// What happened while dispatching one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub logged: bool,
    pub replies_sent: usize,
    pub replies_failed: usize,
}

/// Evaluates inbound messages against the log and rule stores.
#[derive(Debug, Clone)]
pub struct MessageDispatcher {
    rules: RuleStore,
    logs: LogStore,
    criteria: CriterionRegistry,
}

impl MessageDispatcher {
    /// Create a dispatcher with the built-in criteria.
    pub fn new(rules: RuleStore, logs: LogStore) -> Self {
        Self::with_criteria(rules, logs, CriterionRegistry::default())
    }

    pub fn with_criteria(rules: RuleStore, logs: LogStore, criteria: CriterionRegistry) -> Self {
        Self {
            rules,
            logs,
            criteria,
        }
    }

    /// Handle one inbound message for `bot_id`.
    ///
    /// Reply failures are logged and counted, never returned: there is no
    /// caller waiting on this path.
    pub async fn dispatch(
        &self,
        bot_id: &BotId,
        msg: &InboundMessage,
        replier: &dyn Replier,
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        debug!(
            "dispatch: bot={}, chat={}, text='{}'",
            bot_id,
            msg.chat_id,
            msg.text.chars().take(30).collect::<String>()
        );

        if self.logs.is_enabled(bot_id) {
            outcome.logged = self.logs.append(bot_id, log_entry(msg, Utc::now()));
        }

        // Every matching rule fires, in insertion order.
        for rule in self.rules.for_chat(bot_id, &msg.chat_id) {
            let Some(reply) = self.criteria.evaluate(&rule.criterion, &msg.text, &rule.value)
            else {
                if !self.criteria.contains(&rule.criterion) {
                    debug!("Skipping unknown criterion '{}' for bot {}", rule.criterion, bot_id);
                }
                continue;
            };

            match replier.reply(&msg.chat_id, &reply).await {
                Ok(()) => outcome.replies_sent += 1,
                Err(e) => {
                    error!(
                        "Reply failed for bot {} in chat {} ({}): {}",
                        bot_id, msg.chat_id, rule.criterion, e
                    );
                    outcome.replies_failed += 1;
                }
            }
        }

        outcome
    }
}

/// Build the log record for an inbound message.
fn log_entry(msg: &InboundMessage, date: DateTime<Utc>) -> LogEntry {
    LogEntry {
        date,
        user: msg.display_name().to_string(),
        user_id: msg.sender_id,
        chat_id: msg.chat_id.clone(),
        chat_title: msg.chat_title.clone(),
        text: msg.text.clone(),
    }
}
