//! Named, ordered sensor rings

use std::sync::Arc;

use ahash::AHashSet;

use crate::core::error::{BrainError, Result};

const PIONEER_SENSOR_PREFIX: &str = "Pioneer_p3dx_ultrasonicSensor";

/// An ordered, duplicate-free set of sensor ids under a name such as "north".
///
/// Cheap to clone; the id list is shared and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorGroup {
    name: String,
    sensors: Arc<[String]>,
}

impl SensorGroup {
    pub fn new<I, S>(name: impl Into<String>, sensors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let sensors: Vec<String> = sensors.into_iter().map(Into::into).collect();

        if name.trim().is_empty() {
            return Err(BrainError::InvalidGroup("group name is empty".into()));
        }
        if sensors.is_empty() {
            return Err(BrainError::InvalidGroup(format!("group '{}' has no sensors", name)));
        }

        let mut seen = AHashSet::with_capacity(sensors.len());
        for id in &sensors {
            // Fact text is double-quoted, so a `"` in an id cannot be carried through.
            if id.contains('"') {
                return Err(BrainError::InvalidGroup(format!(
                    "group '{}' sensor id {:?} contains a double quote",
                    name, id
                )));
            }
            if !seen.insert(id.as_str()) {
                return Err(BrainError::InvalidGroup(format!(
                    "group '{}' lists sensor '{}' more than once",
                    name, id
                )));
            }
        }

        Ok(Self {
            name,
            sensors: sensors.into(),
        })
    }

    /// The Pioneer P3-DX front ring (sensors 1-8)
    pub fn north() -> Self {
        Self::pioneer_ring("north", 1..=8)
    }

    /// The Pioneer P3-DX rear ring (sensors 9-16)
    pub fn south() -> Self {
        Self::pioneer_ring("south", 9..=16)
    }

    /// Default ring for a known group name
    pub fn default_for(name: &str) -> Result<Self> {
        match name {
            "north" => Ok(Self::north()),
            "south" => Ok(Self::south()),
            other => Err(BrainError::InvalidGroup(format!(
                "no default sensors for group '{}'",
                other
            ))),
        }
    }

    fn pioneer_ring(name: &str, range: std::ops::RangeInclusive<u32>) -> Self {
        let sensors: Vec<String> = range
            .map(|i| format!("{}{}", PIONEER_SENSOR_PREFIX, i))
            .collect();
        Self {
            name: name.to_string(),
            sensors: sensors.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sensors(&self) -> &[String] {
        &self.sensors
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Always false for a constructed group
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Perception predicate for this group, e.g. `perceptionNorth`
    pub fn perception_predicate(&self, prefix: &str) -> String {
        let mut chars = self.name.chars();
        let capitalised: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("{}{}", prefix, capitalised)
    }
}
