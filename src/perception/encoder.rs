//! Perception encoder - raw sensor payloads to canonical percepts

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{BrainError, Result};
use crate::perception::reading::{RawReading, SensorReading};

/// What one sensor contributes to the world state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerceptValue {
    /// Ok read, something in front of the sensor
    Detected,
    /// Ok read, nothing in front of the sensor
    Clear,
    /// The read itself failed
    Unknown,
}

impl PerceptValue {
    /// Symbolic spelling used in facts: "True", "False" or "None"
    pub fn as_str(&self) -> &'static str {
        match self {
            PerceptValue::Detected => "True",
            PerceptValue::Clear => "False",
            PerceptValue::Unknown => "None",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "True" => Some(PerceptValue::Detected),
            "False" => Some(PerceptValue::Clear),
            "None" => Some(PerceptValue::Unknown),
            _ => None,
        }
    }
}

impl From<bool> for PerceptValue {
    fn from(detected: bool) -> Self {
        if detected {
            PerceptValue::Detected
        } else {
            PerceptValue::Clear
        }
    }
}

impl fmt::Display for PerceptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical (sensor id, value) pair for one tick
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Percept {
    pub sensor_id: String,
    pub value: PerceptValue,
}

impl Percept {
    pub fn new(sensor_id: impl Into<String>, value: PerceptValue) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            value,
        }
    }
}

impl fmt::Display for Percept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "['{}', '{}']", self.sensor_id, self.value)
    }
}

/// Replace double quotes so a term can sit inside a double-quoted fact
pub fn escape_quotes(term: &str) -> String {
    term.replace('"', "'")
}

/// Encode a single sensor payload.
///
/// A non-ok status always yields `Unknown`, whatever the other fields say.
pub fn encode_one(sensor_id: &str, raw: &RawReading) -> Result<Percept> {
    let reading = SensorReading::try_from(raw).map_err(|reason| BrainError::MalformedReading {
        sensor: sensor_id.to_string(),
        reason,
    })?;

    let value = if reading.is_ok() {
        PerceptValue::from(reading.detected)
    } else {
        PerceptValue::Unknown
    };

    Ok(Percept::new(sensor_id, value))
}

/// Encode a batch, preserving input order. Stops at the first malformed payload.
pub fn encode_batch<S: AsRef<str>>(readings: &[(S, RawReading)]) -> Result<Vec<Percept>> {
    readings
        .iter()
        .map(|(sensor_id, raw)| encode_one(sensor_id.as_ref(), raw))
        .collect()
}
