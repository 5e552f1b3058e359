//! Control loop - orchestrates one controller's ticks
//!
//! poll sensors -> encode percepts -> build world state -> decide -> actuate -> sleep
//!
//! Ticks never overlap. A stop request is honoured between ticks, and the
//! simulator session is released on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::actions::catalog::{Decision, SpeedLevel};
use crate::core::config::{ControllerConfig, ShapeErrorPolicy};
use crate::core::error::{BrainError, Result};
use crate::core::types::{ControllerId, Tick};
use crate::gateway::{SensorGateway, TransportError};
use crate::perception::encoder::encode_batch;
use crate::perception::reading::RawReading;
use crate::rules::engine::RuleBase;
use crate::simulation::connect::connect_with_retry;
use crate::simulation::rule_eval::RuleEvaluator;
use crate::world::{SensorGroup, WorldState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Disconnected,
    Connecting,
    Connected,
    Ticking,
    ShuttingDown,
    /// Session released; the loop will not run again
    Terminated,
}

/// Result of one completed tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: Tick,
    pub state: WorldState,
    pub decision: Decision,
}

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Ticks that reached a decision
    pub decided_ticks: u64,
    /// Ticks aborted before deciding (read failures, malformed state)
    pub skipped_ticks: u64,
    /// Connection attempts across the initial connect and any reconnects
    pub connect_attempts: u32,
    pub last_decision: Option<Decision>,
}

/// Cloneable request to stop the loop after the current tick
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type Observer = Box<dyn FnMut(&TickReport)>;
type Sleeper = Box<dyn FnMut(Duration)>;

pub struct ControlLoop<G: SensorGateway, R: RuleBase> {
    id: ControllerId,
    config: ControllerConfig,
    group: SensorGroup,
    gateway: G,
    evaluator: RuleEvaluator<R>,
    speed: SpeedLevel,
    state: ControlState,
    tick: Tick,
    last_state: Option<WorldState>,
    stop: StopHandle,
    observer: Option<Observer>,
    sleep: Sleeper,
}

impl<G: SensorGateway, R: RuleBase> ControlLoop<G, R> {
    pub fn new(
        config: ControllerConfig,
        group: SensorGroup,
        gateway: G,
        evaluator: RuleEvaluator<R>,
    ) -> Self {
        let speed = SpeedLevel::new(config.speed_level);
        Self {
            id: ControllerId::new(),
            config,
            group,
            gateway,
            evaluator,
            speed,
            state: ControlState::Disconnected,
            tick: 0,
            last_state: None,
            stop: StopHandle::default(),
            observer: None,
            sleep: Box::new(std::thread::sleep),
        }
    }

    /// Called with every completed tick
    pub fn with_observer(mut self, observer: impl FnMut(&TickReport) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Replace the sleep used for tick delays and connection backoff
    pub fn with_sleep(mut self, sleep: impl FnMut(Duration) + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    pub fn id(&self) -> ControllerId {
        self.id
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn group(&self) -> &SensorGroup {
        &self.group
    }

    /// Swap the active sensor group. Takes effect from the next tick.
    pub fn replace_group(&mut self, group: SensorGroup) {
        tracing::info!("Switching sensor group '{}' -> '{}'", self.group.name(), group.name());
        self.group = group;
    }

    pub fn current_decision(&self) -> Option<Decision> {
        self.evaluator.current()
    }

    pub fn last_state(&self) -> Option<&WorldState> {
        self.last_state.as_ref()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn evaluator(&self) -> &RuleEvaluator<R> {
        &self.evaluator
    }

    /// Connect, tick until stopped or `max_ticks`, then always disconnect.
    pub fn run(&mut self) -> Result<RunSummary> {
        let span = tracing::info_span!("controller", id = %self.id, group = %self.group.name());
        let _enter = span.enter();

        let mut summary = RunSummary::default();
        let result = self.connect_and_tick(&mut summary);
        self.shutdown();

        match result {
            Ok(()) => {
                tracing::info!(
                    "Control loop finished: {} decided, {} skipped",
                    summary.decided_ticks,
                    summary.skipped_ticks
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::error!("Control loop terminated: {}", e);
                Err(e)
            }
        }
    }

    fn connect_and_tick(&mut self, summary: &mut RunSummary) -> Result<()> {
        self.connect(summary)?;
        self.state = ControlState::Ticking;

        while !self.should_stop() {
            match self.run_tick() {
                Ok(report) => {
                    summary.decided_ticks += 1;
                    summary.last_decision = Some(report.decision);
                    if let Some(observer) = self.observer.as_mut() {
                        observer(&report);
                    }
                }
                Err(e) => self.on_tick_error(e, summary)?,
            }

            (self.sleep)(self.config.tick_delay());
        }

        Ok(())
    }

    fn connect(&mut self, summary: &mut RunSummary) -> Result<()> {
        self.state = ControlState::Connecting;
        let attempts = connect_with_retry(
            &mut self.gateway,
            &self.config.host,
            self.config.port,
            &self.config.retry,
            &mut self.sleep,
        )?;
        summary.connect_attempts += attempts;
        self.state = ControlState::Connected;
        Ok(())
    }

    /// Decide whether a failed tick ends the run.
    fn on_tick_error(&mut self, err: BrainError, summary: &mut RunSummary) -> Result<()> {
        match err {
            BrainError::StateShape(ref msg) if self.config.on_shape_error == ShapeErrorPolicy::Retry => {
                tracing::warn!("Tick {} skipped, malformed world state: {}", self.tick, msg);
                summary.skipped_ticks += 1;
                Ok(())
            }
            BrainError::Transport(TransportError::NotConnected) => {
                tracing::warn!("Tick {} lost the simulator session, reconnecting", self.tick);
                summary.skipped_ticks += 1;
                self.connect(summary)?;
                self.state = ControlState::Ticking;
                Ok(())
            }
            e if !e.is_fatal() => {
                tracing::warn!("Tick {} aborted: {}", self.tick, e);
                summary.skipped_ticks += 1;
                Ok(())
            }
            e => Err(e),
        }
    }

    fn should_stop(&self) -> bool {
        if self.stop.is_stopped() {
            tracing::info!("Stop requested after tick {}", self.tick);
            return true;
        }
        self.config.max_ticks.is_some_and(|max| self.tick >= max)
    }

    /// One full poll -> encode -> decide -> act cycle.
    ///
    /// Nothing is decided or actuated unless every sensor was read and the
    /// resulting state matches the group.
    pub fn run_tick(&mut self) -> Result<TickReport> {
        self.tick += 1;

        let readings = self.poll_sensors()?;
        let percepts = encode_batch(&readings)?;
        let state = WorldState::new(self.group.clone(), percepts)?;
        let decision = self.evaluator.decide(&state)?;

        tracing::debug!(tick = self.tick, %decision, "tick decided");

        if self.config.actuate {
            let command = decision.to_command(self.speed);
            if let Err(e) = self.gateway.actuate(&command) {
                tracing::warn!("Actuation of {:?} failed: {}", command.name, e);
            }
        }

        self.last_state = Some(state.clone());
        Ok(TickReport {
            tick: self.tick,
            state,
            decision,
        })
    }

    fn poll_sensors(&mut self) -> Result<Vec<(String, RawReading)>> {
        let mut readings = Vec::with_capacity(self.group.len());
        for sensor in self.group.sensors() {
            let raw = self.gateway.read_sensor(sensor)?;
            readings.push((sensor.clone(), raw));
        }
        Ok(readings)
    }

    fn shutdown(&mut self) {
        self.state = ControlState::ShuttingDown;
        self.gateway.disconnect();
        self.state = ControlState::Terminated;
    }
}
