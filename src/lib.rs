//! Robot Brain - reactive rule-driven controller for a simulated robot
//!
//! Each tick polls a ring of proximity sensors, encodes the readings into a
//! symbolic world state, and asks a rule base for one of five movement decisions.

pub mod actions;
pub mod core;
pub mod gateway;
pub mod perception;
pub mod rules;
pub mod simulation;
pub mod world;
