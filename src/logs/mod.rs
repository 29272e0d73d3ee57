//! Per-bot inbound message logs.

mod store;

pub use store::{LOG_CAPACITY, LogEntry, LogSnapshot, LogStore};
