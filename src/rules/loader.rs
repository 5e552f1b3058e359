//! Load decision clauses from TOML rule files
//!
//! ```toml
//! [[clauses]]
//! head = "takeDecision"
//! body = "perceptionNorth"
//! decision = "North"
//! description = "Path ahead is clear"
//! when = { Pioneer_p3dx_ultrasonicSensor4 = "False", Pioneer_p3dx_ultrasonicSensor5 = "False" }
//! ```

use std::fs;
use std::path::Path;

use crate::perception::PerceptValue;
use crate::rules::engine::RuleEngineError;

/// Expected value for one sensor in a clause condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// `"_"` - any value, but the sensor must be present in the fact
    Any,
    Is(PerceptValue),
}

impl Expected {
    pub fn matches(&self, value: PerceptValue) -> bool {
        match self {
            Expected::Any => true,
            Expected::Is(expected) => *expected == value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub sensor_id: String,
    pub expected: Expected,
}

/// `head(Decision) :- body(State), <conditions on State>.`
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub head: String,
    pub body: String,
    /// Bound as-is; the engine does not police the vocabulary
    pub decision: String,
    pub conditions: Vec<Condition>,
    pub description: String,
}

impl Clause {
    /// True when every condition names a sensor in `fact` with a matching value
    pub fn matches(&self, fact: &[(String, PerceptValue)]) -> bool {
        self.conditions.iter().all(|condition| {
            fact.iter()
                .find(|(id, _)| *id == condition.sensor_id)
                .map(|(_, value)| condition.expected.matches(*value))
                .unwrap_or(false)
        })
    }
}

/// Read and parse a rule file
pub fn load_rule_file(path: &Path) -> Result<Vec<Clause>, RuleEngineError> {
    let source_name = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| RuleEngineError::Load {
        source_name: source_name.clone(),
        reason: e.to_string(),
    })?;
    parse_rule_file(&content)
        .map_err(|reason| RuleEngineError::Load { source_name, reason })
}

/// Parse rule file content. Clause order is preserved.
pub fn parse_rule_file(content: &str) -> Result<Vec<Clause>, String> {
    let toml: toml::Value = content.parse()
        .map_err(|e| format!("Invalid TOML: {}", e))?;

    let mut clauses = Vec::new();

    if let Some(entries) = toml.get("clauses") {
        let entries = entries.as_array()
            .ok_or_else(|| "'clauses' must be an array of tables".to_string())?;
        for (index, entry) in entries.iter().enumerate() {
            clauses.push(parse_clause(entry, index)?);
        }
    }

    Ok(clauses)
}

fn parse_clause(value: &toml::Value, index: usize) -> Result<Clause, String> {
    let head = required_str(value, "head", index)?;
    let body = required_str(value, "body", index)?;
    let decision = required_str(value, "decision", index)?;

    let description = value.get("description")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let mut conditions = Vec::new();
    if let Some(when) = value.get("when") {
        let table = when.as_table()
            .ok_or_else(|| format!("clause {}: 'when' must be a table", index))?;
        for (sensor_id, expected) in table {
            let symbol = expected.as_str()
                .ok_or_else(|| format!("clause {}: condition on '{}' must be a string", index, sensor_id))?;
            conditions.push(Condition {
                sensor_id: sensor_id.clone(),
                expected: parse_expected(symbol)
                    .ok_or_else(|| format!("clause {}: unknown value '{}' for '{}'", index, symbol, sensor_id))?,
            });
        }
    }

    Ok(Clause {
        head,
        body,
        decision,
        conditions,
        description,
    })
}

fn required_str(value: &toml::Value, key: &str, index: usize) -> Result<String, String> {
    value.get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| format!("clause {}: missing {}", index, key))
}

fn parse_expected(symbol: &str) -> Option<Expected> {
    match symbol {
        "_" => Some(Expected::Any),
        other => PerceptValue::from_symbol(other).map(Expected::Is),
    }
}
