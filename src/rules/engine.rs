//! Capability boundary around the rule engine
//!
//! The evaluator only ever needs four operations from a logic engine: consult a
//! rule source, retract every fact for a predicate, assert a new fact, and query a
//! predicate for bindings of one free variable.

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleEngineError {
    #[error("No rule source has been loaded")]
    NotLoaded,

    #[error("Failed to load rules from {source_name}: {reason}")]
    Load { source_name: String, reason: String },

    #[error("Malformed fact for {predicate}: {reason}")]
    MalformedFact { predicate: String, reason: String },

    #[error("Rule engine unavailable: {0}")]
    Unavailable(String),
}

/// One solution of a query: the free variable and the value it was bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    pub variable: String,
    pub value: String,
}

impl Binding {
    pub fn new(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            value: value.into(),
        }
    }
}

/// A logic engine session.
///
/// Facts are plain text; callers escape any delimiter characters before asserting.
pub trait RuleBase {
    /// Consult a rule source. Loading the same source again replaces its rules.
    fn load(&mut self, source: &Path) -> Result<(), RuleEngineError>;

    /// Remove every fact asserted for `predicate`. A no-op when there are none.
    fn retract(&mut self, predicate: &str) -> Result<(), RuleEngineError>;

    /// Append a fact for `predicate`.
    fn assert_fact(&mut self, predicate: &str, fact: &str) -> Result<(), RuleEngineError>;

    /// Solutions of `predicate(variable)` in engine order.
    fn query(&mut self, predicate: &str, variable: &str) -> Result<Vec<Binding>, RuleEngineError>;
}

impl<R: RuleBase + ?Sized> RuleBase for Box<R> {
    fn load(&mut self, source: &Path) -> Result<(), RuleEngineError> {
        (**self).load(source)
    }

    fn retract(&mut self, predicate: &str) -> Result<(), RuleEngineError> {
        (**self).retract(predicate)
    }

    fn assert_fact(&mut self, predicate: &str, fact: &str) -> Result<(), RuleEngineError> {
        (**self).assert_fact(predicate, fact)
    }

    fn query(&mut self, predicate: &str, variable: &str) -> Result<Vec<Binding>, RuleEngineError> {
        (**self).query(predicate, variable)
    }
}
