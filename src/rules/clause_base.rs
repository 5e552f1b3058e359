//! In-memory rule engine over TOML clause files

use std::path::{Path, PathBuf};

use ahash::AHashMap;

use crate::perception::PerceptValue;
use crate::rules::engine::{Binding, RuleBase, RuleEngineError};
use crate::rules::fact::parse_fact;
use crate::rules::loader::{load_rule_file, Clause};

type Fact = Vec<(String, PerceptValue)>;

/// Clause store plus a dynamic fact database.
///
/// Clauses are grouped by the source they were consulted from, in consult order.
#[derive(Debug, Default)]
pub struct ClauseBase {
    sources: Vec<(PathBuf, Vec<Clause>)>,
    facts: AHashMap<String, Vec<Fact>>,
}

impl ClauseBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// A base pre-loaded with clauses that did not come from a file
    pub fn from_clauses(clauses: Vec<Clause>) -> Self {
        Self {
            sources: vec![(PathBuf::from("<memory>"), clauses)],
            facts: AHashMap::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        !self.sources.is_empty()
    }

    pub fn clause_count(&self) -> usize {
        self.sources.iter().map(|(_, clauses)| clauses.len()).sum()
    }

    pub fn fact_count(&self, predicate: &str) -> usize {
        self.facts.get(predicate).map(Vec::len).unwrap_or(0)
    }

    fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.sources.iter().flat_map(|(_, clauses)| clauses.iter())
    }
}

impl RuleBase for ClauseBase {
    fn load(&mut self, source: &Path) -> Result<(), RuleEngineError> {
        let clauses = load_rule_file(source)?;
        tracing::debug!("Consulted {} clauses from {}", clauses.len(), source.display());

        match self.sources.iter_mut().find(|(path, _)| path.as_path() == source) {
            Some((_, existing)) => *existing = clauses,
            None => self.sources.push((source.to_path_buf(), clauses)),
        }
        Ok(())
    }

    fn retract(&mut self, predicate: &str) -> Result<(), RuleEngineError> {
        self.facts.remove(predicate);
        Ok(())
    }

    fn assert_fact(&mut self, predicate: &str, fact: &str) -> Result<(), RuleEngineError> {
        let malformed = |reason: String| RuleEngineError::MalformedFact {
            predicate: predicate.to_string(),
            reason,
        };

        let parsed = parse_fact(fact)
            .map_err(malformed)?
            .into_iter()
            .map(|(id, symbol)| match PerceptValue::from_symbol(&symbol) {
                Some(value) => Ok((id, value)),
                None => Err(malformed(format!("unknown value '{}' for '{}'", symbol, id))),
            })
            .collect::<Result<Fact, _>>()?;

        self.facts.entry(predicate.to_string()).or_default().push(parsed);
        Ok(())
    }

    fn query(&mut self, predicate: &str, variable: &str) -> Result<Vec<Binding>, RuleEngineError> {
        if !self.is_loaded() {
            return Err(RuleEngineError::NotLoaded);
        }

        let mut bindings = Vec::new();
        for clause in self.clauses().filter(|c| c.head == predicate) {
            let Some(facts) = self.facts.get(&clause.body) else {
                continue;
            };
            for fact in facts {
                if clause.matches(fact) {
                    bindings.push(Binding::new(variable, clause.decision.clone()));
                }
            }
        }

        Ok(bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::loader::{Condition, Expected};

    fn clause(decision: &str, conditions: &[(&str, Expected)]) -> Clause {
        Clause {
            head: "takeDecision".into(),
            body: "perceptionNorth".into(),
            decision: decision.into(),
            conditions: conditions
                .iter()
                .map(|(id, expected)| Condition {
                    sensor_id: id.to_string(),
                    expected: *expected,
                })
                .collect(),
            description: String::new(),
        }
    }

    fn values(bindings: &[Binding]) -> Vec<&str> {
        bindings.iter().map(|b| b.value.as_str()).collect()
    }

    #[test]
    fn test_query_before_load_fails() {
        let mut base = ClauseBase::new();
        assert_eq!(base.query("takeDecision", "D"), Err(RuleEngineError::NotLoaded));
    }

    #[test]
    fn test_query_without_facts_has_no_bindings() {
        let mut base = ClauseBase::from_clauses(vec![clause("North", &[])]);
        assert!(base.query("takeDecision", "D").unwrap().is_empty());
    }

    #[test]
    fn test_matching_clauses_bind_in_order() {
        let mut base = ClauseBase::from_clauses(vec![
            clause("North", &[("S1", Expected::Is(PerceptValue::Clear))]),
            clause("East", &[("S1", Expected::Is(PerceptValue::Detected))]),
            clause("Stay", &[]),
        ]);
        base.assert_fact("perceptionNorth", r#"[["S1","False"]]"#).unwrap();

        let bindings = base.query("takeDecision", "D").unwrap();
        assert_eq!(values(&bindings), vec!["North", "Stay"]);
        assert_eq!(bindings[0].variable, "D");
    }

    #[test]
    fn test_retract_clears_facts() {
        let mut base = ClauseBase::from_clauses(vec![clause("North", &[])]);
        base.assert_fact("perceptionNorth", r#"[["S1","True"]]"#).unwrap();
        base.assert_fact("perceptionNorth", r#"[["S1","False"]]"#).unwrap();
        assert_eq!(base.fact_count("perceptionNorth"), 2);
        assert_eq!(base.query("takeDecision", "D").unwrap().len(), 2);

        base.retract("perceptionNorth").unwrap();
        assert_eq!(base.fact_count("perceptionNorth"), 0);
        assert!(base.query("takeDecision", "D").unwrap().is_empty());

        // Retracting again is a no-op
        assert!(base.retract("perceptionNorth").is_ok());
    }

    #[test]
    fn test_malformed_fact_rejected() {
        let mut base = ClauseBase::from_clauses(vec![]);
        assert!(matches!(
            base.assert_fact("perceptionNorth", "[[S1, True]]"),
            Err(RuleEngineError::MalformedFact { .. })
        ));
        assert!(matches!(
            base.assert_fact("perceptionNorth", r#"[["S1","Maybe"]]"#),
            Err(RuleEngineError::MalformedFact { .. })
        ));
        assert_eq!(base.fact_count("perceptionNorth"), 0);
    }

    #[test]
    fn test_other_heads_ignored() {
        let mut other = clause("West", &[]);
        other.head = "takeOtherDecision".into();
        let mut base = ClauseBase::from_clauses(vec![other]);
        base.assert_fact("perceptionNorth", r#"[["S1","True"]]"#).unwrap();
        assert!(base.query("takeDecision", "D").unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file_leaves_base_unloaded() {
        let mut base = ClauseBase::new();
        assert!(base.load(Path::new("missing/behaviour.toml")).is_err());
        assert!(!base.is_loaded());
    }
}
