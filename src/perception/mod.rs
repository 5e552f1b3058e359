//! Perception - turning proximity sensor payloads into percepts

pub mod encoder;
pub mod reading;

pub use encoder::{encode_batch, encode_one, escape_quotes, Percept, PerceptValue};
pub use reading::{RawField, RawReading, SensorReading, STATUS_OK};
