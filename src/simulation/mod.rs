pub mod connect;
pub mod rule_eval;
pub mod tick;

pub use connect::connect_with_retry;
pub use rule_eval::{RuleEvaluator, FALLBACK_DECISION};
pub use tick::{ControlLoop, ControlState, RunSummary, StopHandle, TickReport};
