//! Alert evaluation and message formatting

mod evaluator;
mod format;

pub use evaluator::{evaluate, needs_seed, AlertDecision};
pub use format::{format_alert, format_percent, format_price, format_snapshot, format_subscribed};
