//! Simulator transport boundary
//!
//! The control loop talks to the simulated world only through [`SensorGateway`]:
//! open a session, read one proximity sensor at a time, forward actuation
//! commands, and tear the session down.

pub mod simulated;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::perception::reading::RawReading;

pub use simulated::{SimulatedWorld, APPLIED_LOG_CAPACITY};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Not connected to the simulator")]
    NotConnected,

    #[error("Connection refused by {host}:{port}")]
    ConnectRefused { host: String, port: u16 },

    #[error("Unknown sensor: {0}")]
    UnknownSensor(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Actuation failed: {0}")]
    Actuation(String),
}

/// A named command with numeric parameters, e.g. `move {heading_deg, speed}`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActuationCommand {
    pub name: String,
    pub params: BTreeMap<String, f32>,
}

impl ActuationCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: f32) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

/// Session with the simulated world.
///
/// Every call blocks until the simulator answers.
pub trait SensorGateway {
    /// Open a session. A refused attempt leaves the gateway disconnected.
    fn connect(&mut self, host: &str, port: u16) -> Result<(), TransportError>;

    /// One blocking read of the named proximity sensor.
    fn read_sensor(&mut self, name: &str) -> Result<RawReading, TransportError>;

    /// Forward a command to the robot's actuators.
    fn actuate(&mut self, command: &ActuationCommand) -> Result<(), TransportError>;

    /// Flush any in-flight command, then close the session.
    ///
    /// Must be a no-op when no session was ever opened.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;
}

impl<G: SensorGateway + ?Sized> SensorGateway for Box<G> {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), TransportError> {
        (**self).connect(host, port)
    }

    fn read_sensor(&mut self, name: &str) -> Result<RawReading, TransportError> {
        (**self).read_sensor(name)
    }

    fn actuate(&mut self, command: &ActuationCommand) -> Result<(), TransportError> {
        (**self).actuate(command)
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}
