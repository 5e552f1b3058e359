//! In-process simulated world
//!
//! Stands in for the remote simulator: seeded, so a run with a fixed seed is
//! reproducible, and tunable through [`SimulationSettings`].

use std::collections::VecDeque;

use ahash::AHashSet;
use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::SimulationSettings;
use crate::gateway::{ActuationCommand, SensorGateway, TransportError};
use crate::perception::reading::RawReading;

/// Status code reported for a failed proximity read
const STATUS_READ_FAILED: i32 = 1;

/// Detection range of the simulated ultrasonic sensors (metres)
const MIN_RANGE: f32 = 0.05;
const MAX_RANGE: f32 = 1.0;

/// Most recent applied commands kept for inspection
pub const APPLIED_LOG_CAPACITY: usize = 64;

#[derive(Debug)]
pub struct SimulatedWorld {
    rng: ChaCha8Rng,
    seed: u64,
    settings: SimulationSettings,
    known_sensors: Option<AHashSet<String>>,
    refusals_left: u32,
    session: Option<(String, u16)>,
    pending: Vec<ActuationCommand>,
    applied: VecDeque<ActuationCommand>,
    applied_total: u64,
    reads: u64,
}

impl SimulatedWorld {
    pub fn new(mut settings: SimulationSettings) -> Self {
        settings.detection_probability = settings.detection_probability.clamp(0.0, 1.0);
        settings.failure_probability = settings.failure_probability.clamp(0.0, 1.0);
        let seed = settings.seed.unwrap_or_else(rand::random);
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            refusals_left: settings.connect_failures,
            settings,
            known_sensors: None,
            session: None,
            pending: Vec::new(),
            applied: VecDeque::with_capacity(APPLIED_LOG_CAPACITY),
            applied_total: 0,
            reads: 0,
        }
    }

    /// Only the listed sensors exist; reading any other name is a transport error.
    pub fn with_sensors<I, S>(mut self, sensors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_sensors = Some(sensors.into_iter().map(Into::into).collect());
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Last commands the simulated robot has received, oldest first.
    /// Holds at most [`APPLIED_LOG_CAPACITY`] entries.
    pub fn applied_commands(&self) -> &VecDeque<ActuationCommand> {
        &self.applied
    }

    /// Commands received over the world's lifetime
    pub fn applied_total(&self) -> u64 {
        self.applied_total
    }

    pub fn last_command(&self) -> Option<&ActuationCommand> {
        self.pending.last().or_else(|| self.applied.back())
    }

    fn flush(&mut self) {
        for command in self.pending.drain(..) {
            if self.applied.len() == APPLIED_LOG_CAPACITY {
                self.applied.pop_front();
            }
            self.applied.push_back(command);
            self.applied_total += 1;
        }
    }

    fn sample_reading(&mut self) -> RawReading {
        if self.rng.gen_bool(self.settings.failure_probability) {
            return RawReading::failed(STATUS_READ_FAILED);
        }

        if self.rng.gen_bool(self.settings.detection_probability) {
            let distance = self.rng.gen_range(MIN_RANGE..MAX_RANGE);
            let lateral = self.rng.gen_range(-0.1..0.1);
            let handle = self.rng.gen_range(1..10_000);
            RawReading::new(0, true, Vec3::new(lateral, 0.0, distance), handle, Vec3::NEG_Z)
        } else {
            RawReading::new(0, false, Vec3::ZERO, 0, Vec3::ZERO)
        }
    }
}

impl SensorGateway for SimulatedWorld {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), TransportError> {
        // A new attempt always drops whatever session was open.
        self.session = None;

        if self.refusals_left > 0 {
            self.refusals_left -= 1;
            return Err(TransportError::ConnectRefused {
                host: host.to_string(),
                port,
            });
        }

        tracing::debug!("Simulated world accepted {}:{} (seed {})", host, port, self.seed);
        self.session = Some((host.to_string(), port));
        Ok(())
    }

    fn read_sensor(&mut self, name: &str) -> Result<RawReading, TransportError> {
        if self.session.is_none() {
            return Err(TransportError::NotConnected);
        }
        if let Some(known) = &self.known_sensors {
            if !known.contains(name) {
                return Err(TransportError::UnknownSensor(name.to_string()));
            }
        }

        // Commands sent before this read have reached the robot by now.
        self.flush();
        self.reads += 1;
        Ok(self.sample_reading())
    }

    fn actuate(&mut self, command: &ActuationCommand) -> Result<(), TransportError> {
        if self.session.is_none() {
            return Err(TransportError::NotConnected);
        }
        self.pending.push(command.clone());
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.session.take().is_some() {
            self.flush();
            tracing::debug!("Simulated world session closed after {} reads", self.reads);
        }
    }

    fn is_connected(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::reading::SensorReading;

    fn settings(seed: u64) -> SimulationSettings {
        SimulationSettings {
            seed: Some(seed),
            ..SimulationSettings::default()
        }
    }

    #[test]
    fn test_refuses_configured_attempts() {
        let mut world = SimulatedWorld::new(SimulationSettings {
            connect_failures: 2,
            ..settings(1)
        });

        assert!(matches!(
            world.connect("127.0.0.1", 19997),
            Err(TransportError::ConnectRefused { port: 19997, .. })
        ));
        assert!(world.connect("127.0.0.1", 19997).is_err());
        assert!(world.connect("127.0.0.1", 19997).is_ok());
        assert!(world.is_connected());
    }

    #[test]
    fn test_read_requires_session() {
        let mut world = SimulatedWorld::new(settings(1));
        assert_eq!(world.read_sensor("S1"), Err(TransportError::NotConnected));
    }

    #[test]
    fn test_unknown_sensor() {
        let mut world = SimulatedWorld::new(settings(1)).with_sensors(["S1"]);
        world.connect("localhost", 1).unwrap();
        assert!(world.read_sensor("S1").is_ok());
        assert_eq!(
            world.read_sensor("S2"),
            Err(TransportError::UnknownSensor("S2".into()))
        );
    }

    #[test]
    fn test_same_seed_same_readings() {
        let mut a = SimulatedWorld::new(settings(42));
        let mut b = SimulatedWorld::new(settings(42));
        a.connect("h", 1).unwrap();
        b.connect("h", 1).unwrap();

        for _ in 0..50 {
            assert_eq!(a.read_sensor("S1").unwrap(), b.read_sensor("S1").unwrap());
        }
    }

    #[test]
    fn test_readings_are_well_formed() {
        let mut world = SimulatedWorld::new(SimulationSettings {
            failure_probability: 0.5,
            detection_probability: 0.5,
            ..settings(7)
        });
        world.connect("h", 1).unwrap();

        for _ in 0..100 {
            let raw = world.read_sensor("S1").unwrap();
            assert!(SensorReading::try_from(&raw).is_ok());
        }
        assert_eq!(world.reads(), 100);
    }

    #[test]
    fn test_always_failing_sensor() {
        let mut world = SimulatedWorld::new(SimulationSettings {
            failure_probability: 1.0,
            ..settings(3)
        });
        world.connect("h", 1).unwrap();
        let reading = SensorReading::try_from(&world.read_sensor("S1").unwrap()).unwrap();
        assert!(!reading.is_ok());
    }

    #[test]
    fn test_disconnect_flushes_pending_commands() {
        let mut world = SimulatedWorld::new(settings(1));
        world.connect("h", 1).unwrap();
        world.actuate(&ActuationCommand::new("stop")).unwrap();
        assert!(world.applied_commands().is_empty());
        assert_eq!(world.last_command().map(|c| c.name.as_str()), Some("stop"));

        world.disconnect();
        assert!(!world.is_connected());
        assert_eq!(world.applied_commands().len(), 1);
        assert_eq!(world.applied_total(), 1);
    }

    #[test]
    fn test_applied_log_is_bounded() {
        let mut world = SimulatedWorld::new(settings(1));
        world.connect("h", 1).unwrap();

        let sent = APPLIED_LOG_CAPACITY * 3 + 5;
        for i in 0..sent {
            world
                .actuate(&ActuationCommand::new("move").with_param("speed", i as f32))
                .unwrap();
            world.read_sensor("S1").unwrap();
        }
        world.disconnect();

        assert_eq!(world.applied_commands().len(), APPLIED_LOG_CAPACITY);
        assert_eq!(world.applied_total(), sent as u64);
        let newest = world.applied_commands().back().unwrap();
        assert_eq!(newest.params.get("speed"), Some(&((sent - 1) as f32)));
        let oldest = world.applied_commands().front().unwrap();
        assert_eq!(oldest.params.get("speed"), Some(&((sent - APPLIED_LOG_CAPACITY) as f32)));
    }

    #[test]
    fn test_disconnect_without_connect_is_noop() {
        let mut world = SimulatedWorld::new(settings(1));
        world.disconnect();
        world.disconnect();
        assert!(!world.is_connected());
    }

    #[test]
    fn test_actuate_requires_session() {
        let mut world = SimulatedWorld::new(settings(1));
        assert_eq!(
            world.actuate(&ActuationCommand::new("stop")),
            Err(TransportError::NotConnected)
        );
    }
}
