//! Sensor groups and the world state built from them each tick

pub mod group;
pub mod state;

pub use group::SensorGroup;
pub use state::WorldState;
