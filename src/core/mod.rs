pub mod config;
pub mod error;
pub mod types;

pub use config::{ControllerConfig, RetryPolicy, ShapeErrorPolicy, SimulationSettings};
pub use error::{BrainError, Result};
pub use types::{ControllerId, Tick};
