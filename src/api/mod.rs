//! HTTP control API used by the dashboard.

mod error;
mod handlers;
mod router;

pub use router::build_router;
