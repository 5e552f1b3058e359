pub mod catalog;

pub use catalog::{Decision, SpeedLevel};
