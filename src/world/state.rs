//! Per-tick world state snapshot

use std::fmt;

use crate::core::error::{BrainError, Result};
use crate::perception::Percept;
use crate::world::group::SensorGroup;

/// Percepts for one sensor group, one per sensor, in the group's declared order.
///
/// There are no mutators: a new tick builds a new state.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    group: SensorGroup,
    percepts: Vec<Percept>,
}

impl WorldState {
    /// Validate `percepts` against `group` position by position.
    ///
    /// A short, long or permuted list fails with `StateShape`.
    pub fn new(group: SensorGroup, percepts: Vec<Percept>) -> Result<Self> {
        if percepts.len() != group.len() {
            return Err(BrainError::StateShape(format!(
                "group '{}' declares {} sensors but {} percepts were supplied",
                group.name(),
                group.len(),
                percepts.len()
            )));
        }

        if let Some((index, (expected, percept))) = group
            .sensors()
            .iter()
            .zip(&percepts)
            .enumerate()
            .find(|(_, (expected, percept))| **expected != percept.sensor_id)
        {
            return Err(BrainError::StateShape(format!(
                "group '{}' position {} expects sensor '{}' but found '{}'",
                group.name(),
                index,
                expected,
                percept.sensor_id
            )));
        }

        Ok(Self { group, percepts })
    }

    pub fn group(&self) -> &SensorGroup {
        &self.group
    }

    pub fn percepts(&self) -> &[Percept] {
        &self.percepts
    }

    pub fn len(&self) -> usize {
        self.percepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.percepts.is_empty()
    }
}

impl fmt::Display for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, percept) in self.percepts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", percept)?;
        }
        f.write_str("]")
    }
}
