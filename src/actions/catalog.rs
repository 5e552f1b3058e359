//! Decision vocabulary and its actuation mapping

use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::error::BrainError;
use crate::gateway::ActuationCommand;

/// The five actions a controller may ever settle on
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    #[display(fmt = "North")]
    North,
    #[display(fmt = "South")]
    South,
    #[display(fmt = "East")]
    East,
    #[display(fmt = "West")]
    West,
    #[display(fmt = "Stay")]
    Stay,
}

impl Decision {
    pub const ALL: [Decision; 5] = [
        Decision::North,
        Decision::South,
        Decision::East,
        Decision::West,
        Decision::Stay,
    ];

    /// Compass heading in degrees, `None` for `Stay`
    pub fn heading_deg(&self) -> Option<f32> {
        match self {
            Decision::North => Some(0.0),
            Decision::East => Some(90.0),
            Decision::South => Some(180.0),
            Decision::West => Some(270.0),
            Decision::Stay => None,
        }
    }

    pub fn is_movement(&self) -> bool {
        self.heading_deg().is_some()
    }

    pub fn to_command(&self, speed: SpeedLevel) -> ActuationCommand {
        match self.heading_deg() {
            Some(heading) => ActuationCommand::new("move")
                .with_param("heading_deg", heading)
                .with_param("speed", speed.velocity()),
            None => ActuationCommand::new("stop"),
        }
    }
}

impl FromStr for Decision {
    type Err = BrainError;

    /// Accepts exactly the vocabulary spelling; anything else is a contract violation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "North" => Ok(Decision::North),
            "South" => Ok(Decision::South),
            "East" => Ok(Decision::East),
            "West" => Ok(Decision::West),
            "Stay" => Ok(Decision::Stay),
            other => Err(BrainError::InvalidDecision(other.to_string())),
        }
    }
}

/// Velocity steps from the lowest to the highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpeedLevel(usize);

impl SpeedLevel {
    pub const VELOCITIES: [f32; 5] = [5.0, 10.0, 15.0, 20.0, 25.0];

    pub fn lowest() -> Self {
        Self(0)
    }

    pub fn highest() -> Self {
        Self(Self::VELOCITIES.len() - 1)
    }

    /// Out-of-range indices clamp to the highest level.
    pub fn new(index: usize) -> Self {
        Self(index.min(Self::VELOCITIES.len() - 1))
    }

    pub fn index(&self) -> usize {
        self.0
    }

    pub fn velocity(&self) -> f32 {
        Self::VELOCITIES[self.0]
    }
}

impl Default for SpeedLevel {
    fn default() -> Self {
        Self::lowest()
    }
}
