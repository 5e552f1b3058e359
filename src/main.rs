//! Robot Brain - Entry Point
//!
//! Loads the controller configuration and rule base, connects to the simulated
//! world, and runs the control loop, printing the state and decision every tick.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use robot_brain::core::config::ControllerConfig;
use robot_brain::core::error::Result;
use robot_brain::gateway::SimulatedWorld;
use robot_brain::rules::ClauseBase;
use robot_brain::simulation::{ControlLoop, RuleEvaluator, RunSummary};
use robot_brain::world::SensorGroup;

/// Reactive rule-driven controller for a simulated proximity-sensing robot
#[derive(Parser, Debug)]
#[command(name = "robot-brain", version, about)]
struct Args {
    /// Controller configuration file (TOML)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Rule file to consult, overrides the configured one
    #[arg(long, short = 'r')]
    rules: Option<PathBuf>,

    /// Simulator host
    #[arg(long)]
    host: Option<String>,

    /// Simulator remote API port
    #[arg(long)]
    port: Option<u16>,

    /// Sensor group to drive from ("north" or "south")
    #[arg(long, short = 'g')]
    group: Option<String>,

    /// Stop after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Sleep between ticks in milliseconds
    #[arg(long)]
    tick_delay_ms: Option<u64>,

    /// Seed for the simulated world
    #[arg(long)]
    seed: Option<u64>,

    /// Decide without sending actuation commands
    #[arg(long)]
    no_actuate: bool,
}

impl Args {
    fn into_config(self) -> Result<ControllerConfig> {
        let mut config = match &self.config {
            Some(path) => ControllerConfig::from_file(path)?,
            None => ControllerConfig::default(),
        };

        if let Some(rules) = self.rules {
            config.rules_path = rules;
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(group) = self.group {
            config.group = group;
            config.sensors = None;
        }
        if self.max_ticks.is_some() {
            config.max_ticks = self.max_ticks;
        }
        if let Some(delay) = self.tick_delay_ms {
            config.tick_delay_ms = delay;
        }
        if self.seed.is_some() {
            config.simulation.seed = self.seed;
        }
        if self.no_actuate {
            config.actuate = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("robot_brain=info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(summary) => {
            tracing::info!(
                "Done: {} ticks decided, {} skipped, last decision {:?}",
                summary.decided_ticks,
                summary.skipped_ticks,
                summary.last_decision
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("robot-brain: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<RunSummary> {
    let config = args.into_config()?;

    let group = match &config.sensors {
        Some(sensors) => SensorGroup::new(config.group.as_str(), sensors.iter().cloned())?,
        None => SensorGroup::default_for(&config.group)?,
    };
    tracing::info!("Driving from group '{}' ({} sensors)", group.name(), group.len());

    let mut evaluator = RuleEvaluator::from_config(ClauseBase::new(), &config);
    evaluator.load_rules(&config.rules_path)?;

    let world = SimulatedWorld::new(config.simulation.clone());
    tracing::info!("Simulated world seed: {}", world.seed());

    let mut control = ControlLoop::new(config, group, world, evaluator).with_observer(|report| {
        println!("################## Step: {} ##################", report.tick);
        println!("State:");
        println!("{}", report.state);
        println!("Robot Decision:");
        println!("{}", report.decision);
    });

    control.run()
}
