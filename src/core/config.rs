//! Controller configuration with documented defaults
//!
//! Values are read from a TOML file and then selectively overridden by
//! command-line flags in the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::core::error::{BrainError, Result};

/// What the control loop does when a tick produces a malformed world state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShapeErrorPolicy {
    /// Report the tick, skip deciding and acting, continue with the next tick
    #[default]
    Retry,
    /// Treat the mismatch as fatal and shut the loop down
    Terminate,
}

/// Bounded exponential backoff for simulator connection attempts
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Delay after the first failed attempt
    pub initial_backoff_ms: u64,

    /// Upper bound for any single delay
    pub max_backoff_ms: u64,

    /// Growth factor applied after every failed attempt (>= 1.0)
    pub multiplier: f64,

    /// Give up after this many attempts. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 50,
            max_backoff_ms: 2_000,
            multiplier: 2.0,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let raw = self.initial_backoff_ms as f64 * self.multiplier.powi(exponent);
        let capped = raw.min(self.max_backoff_ms as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Knobs for the in-process simulated world
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// RNG seed. A random seed is drawn when absent.
    pub seed: Option<u64>,

    /// Chance that an ok reading reports a detected object
    pub detection_probability: f64,

    /// Chance that a read comes back with a non-ok status code
    pub failure_probability: f64,

    /// Number of connection attempts refused before the world accepts one
    pub connect_failures: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: None,
            detection_probability: 0.3,
            failure_probability: 0.05,
            connect_failures: 0,
        }
    }
}

/// Configuration for one controller instance
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Simulator host
    pub host: String,

    /// Simulator remote API port
    pub port: u16,

    /// Rule file consulted at startup
    pub rules_path: PathBuf,

    /// Active sensor group name ("north" or "south" for the default rings)
    pub group: String,

    /// Explicit sensor ids for the group, replacing the default ring
    pub sensors: Option<Vec<String>>,

    /// Fixed sleep between ticks
    pub tick_delay_ms: u64,

    /// Stop after this many ticks. `None` runs until stopped.
    pub max_ticks: Option<u64>,

    /// Perception predicates are named `<prefix><Group>`, e.g. `perceptionNorth`
    pub perception_predicate_prefix: String,

    /// Predicate queried for a decision
    pub decision_predicate: String,

    /// Free variable bound by the decision query
    pub decision_variable: String,

    /// Index into the five speed levels used for movement commands
    pub speed_level: usize,

    /// Forward decisions to the gateway as actuation commands
    pub actuate: bool,

    pub on_shape_error: ShapeErrorPolicy,

    pub retry: RetryPolicy,

    pub simulation: SimulationSettings,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 19997,
            rules_path: PathBuf::from("data/rules/behaviour.toml"),
            group: "north".to_string(),
            sensors: None,
            tick_delay_ms: 1,
            max_ticks: None,
            perception_predicate_prefix: "perception".to_string(),
            decision_predicate: "takeDecision".to_string(),
            decision_variable: "D".to_string(),
            speed_level: 0,
            actuate: true,
            on_shape_error: ShapeErrorPolicy::Retry,
            retry: RetryPolicy::default(),
            simulation: SimulationSettings::default(),
        }
    }
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| BrainError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ControllerConfig =
            toml::from_str(content).map_err(|e| BrainError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(BrainError::Config("port must be non-zero".into()));
        }

        if self.retry.multiplier < 1.0 {
            return Err(BrainError::Config(format!(
                "retry.multiplier ({}) must be >= 1.0",
                self.retry.multiplier
            )));
        }

        if self.retry.max_attempts == Some(0) {
            return Err(BrainError::Config(
                "retry.max_attempts must be at least 1 when set".into(),
            ));
        }

        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(BrainError::Config(format!(
                "retry.initial_backoff_ms ({}) exceeds retry.max_backoff_ms ({})",
                self.retry.initial_backoff_ms, self.retry.max_backoff_ms
            )));
        }

        for (name, p) in [
            ("detection_probability", self.simulation.detection_probability),
            ("failure_probability", self.simulation.failure_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(BrainError::Config(format!(
                    "simulation.{} ({}) must be within [0, 1]",
                    name, p
                )));
            }
        }

        if self.decision_predicate.trim().is_empty() || self.decision_variable.trim().is_empty() {
            return Err(BrainError::Config(
                "decision_predicate and decision_variable must be set".into(),
            ));
        }

        Ok(())
    }
}
