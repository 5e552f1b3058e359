//! Rule engine boundary and the TOML-backed clause engine

pub mod clause_base;
pub mod engine;
pub mod fact;
mod loader;

pub use clause_base::ClauseBase;
pub use engine::{Binding, RuleBase, RuleEngineError};
pub use fact::{parse_fact, render_percepts};
pub use loader::{load_rule_file, parse_rule_file, Clause, Condition, Expected};
