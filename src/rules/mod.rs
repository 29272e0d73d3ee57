//! Group moderation rules.
//!
//! - `criterion` - Criterion tags and the registry that evaluates them
//! - `store` - Per-bot ordered rule lists

mod criterion;
mod store;

pub use criterion::{Criterion, CriterionRegistry};
pub use store::{Rule, RuleStore};

#[cfg(test)]
pub use criterion::{CONTAINS_CHECKMARK_REPLY, STARTS_WITH_NUMBER_REPLY};
