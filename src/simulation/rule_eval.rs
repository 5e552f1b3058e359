//! Rule evaluation - world state to decision through the rule engine
//!
//! Each call to [`RuleEvaluator::decide`] is one critical section against the
//! engine: retract the group's perception facts, assert the new state, query for
//! a decision. Any engine failure, and an empty answer, both resolve to `Stay`.
//! An answer outside the decision vocabulary is never accepted.

use std::path::Path;

use crate::actions::catalog::Decision;
use crate::core::config::ControllerConfig;
use crate::core::error::{BrainError, Result};
use crate::rules::engine::{RuleBase, RuleEngineError};
use crate::rules::fact::render_percepts;
use crate::world::WorldState;

/// Fallback whenever the rule engine cannot produce an answer
pub const FALLBACK_DECISION: Decision = Decision::Stay;

pub struct RuleEvaluator<R: RuleBase> {
    engine: R,
    perception_prefix: String,
    decision_predicate: String,
    decision_variable: String,
    /// Perception predicate asserted by the previous decide, if any
    asserted: Option<String>,
    current: Option<Decision>,
}

impl<R: RuleBase> RuleEvaluator<R> {
    /// Evaluator using `perception<Group>` facts and `takeDecision(D)` queries
    pub fn new(engine: R) -> Self {
        Self::with_predicates(engine, "perception", "takeDecision", "D")
    }

    pub fn with_predicates(
        engine: R,
        perception_prefix: impl Into<String>,
        decision_predicate: impl Into<String>,
        decision_variable: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            perception_prefix: perception_prefix.into(),
            decision_predicate: decision_predicate.into(),
            decision_variable: decision_variable.into(),
            asserted: None,
            current: None,
        }
    }

    pub fn from_config(engine: R, config: &ControllerConfig) -> Self {
        Self::with_predicates(
            engine,
            config.perception_predicate_prefix.as_str(),
            config.decision_predicate.as_str(),
            config.decision_variable.as_str(),
        )
    }

    /// Consult a rule source. May be called again to reload.
    pub fn load_rules(&mut self, source: &Path) -> Result<()> {
        self.engine
            .load(source)
            .map_err(|e| BrainError::RuleLoad(e.to_string()))?;
        tracing::info!("Loaded rules from {}", source.display());
        Ok(())
    }

    /// Derive the decision for `state` and record it as the current one.
    ///
    /// Only `InvalidDecision` escapes; engine failures become `Stay`.
    pub fn decide(&mut self, state: &WorldState) -> Result<Decision> {
        let predicate = state.group().perception_predicate(&self.perception_prefix);

        let candidate = match self.consult(&predicate, state) {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::debug!("Rule base returned no decision for {}, staying", predicate);
                FALLBACK_DECISION.to_string()
            }
            Err(e) => {
                tracing::warn!("Rule evaluation failed ({}), staying", e);
                FALLBACK_DECISION.to_string()
            }
        };

        let decision: Decision = candidate.parse()?;
        self.current = Some(decision);
        Ok(decision)
    }

    fn consult(
        &mut self,
        predicate: &str,
        state: &WorldState,
    ) -> std::result::Result<Option<String>, RuleEngineError> {
        if let Some(stale) = self.asserted.take() {
            if stale != predicate {
                self.engine.retract(&stale)?;
            }
        }
        self.engine.retract(predicate)?;

        self.engine
            .assert_fact(predicate, &render_percepts(state.percepts()))?;
        self.asserted = Some(predicate.to_string());

        let bindings = self
            .engine
            .query(&self.decision_predicate, &self.decision_variable)?;
        if bindings.len() > 1 {
            tracing::trace!("{} bindings, taking the first", bindings.len());
        }
        Ok(bindings.into_iter().next().map(|b| b.value))
    }

    /// Most recent decision, `None` before the first successful decide
    pub fn current(&self) -> Option<Decision> {
        self.current
    }

    pub fn engine(&self) -> &R {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut R {
        &mut self.engine
    }
}
