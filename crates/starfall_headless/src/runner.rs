//! Headless session runner.
//!
//! Drives a [`Simulation`] with a simulated clock: a fixed frame rate, a
//! [`ProductionTimer`] for production ticks, and a [`Commander`] per side.
//! Each frame runs in this order:
//!
//! 1. Production ticks that fell due
//! 2. Commander decisions (orders are queued)
//! 3. Launch of every queued order
//! 4. [`Simulation::advance_frame`] (orbits, then fleets)

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use starfall_core::config::{ConfigError, GameConfig};
use starfall_core::economy::ProductionTimer;
use starfall_core::error::GameError;
use starfall_core::factions::Owner;
use starfall_core::simulation::{FrameEvents, Outcome, Simulation};

use crate::commander::{Commander, CommanderError, CommanderProfile};
use crate::report::{ArrivalTally, Notification, RunSummary, SideSummary};

/// Errors from setting up or reporting a run.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// A command-line value is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The game configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The session rejected a setup step.
    #[error(transparent)]
    Game(#[from] GameError),
    /// A commander profile could not be loaded.
    #[error(transparent)]
    Commander(#[from] CommanderError),
    /// The summary could not be serialized.
    #[error("Failed to write summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for one headless run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Seed for generation and home selection.
    pub seed: u64,
    /// Canvas width the system is generated for.
    pub canvas_width: f64,
    /// Canvas height the system is generated for.
    pub canvas_height: f64,
    /// Session seconds to simulate before stopping.
    pub duration_secs: f64,
    /// Simulated frames per second.
    pub fps: u32,
    /// Game rules.
    pub game: GameConfig,
    /// Autopilot for the player side; `None` leaves the player idle.
    pub player: Option<CommanderProfile>,
    /// Profile for the AI side.
    pub ai: CommanderProfile,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            canvas_width: 1280.0,
            canvas_height: 720.0,
            duration_secs: 300.0,
            fps: 60,
            game: GameConfig::default(),
            player: Some(CommanderProfile::default()),
            ai: CommanderProfile::aggressive(),
        }
    }
}

impl RunConfig {
    fn validate(&self) -> Result<(), RunnerError> {
        if self.fps == 0 {
            return Err(RunnerError::InvalidArgument("fps must be positive".to_string()));
        }
        if !(self.duration_secs >= 0.0 && self.duration_secs.is_finite()) {
            return Err(RunnerError::InvalidArgument(format!(
                "duration {} is not a non-negative number of seconds",
                self.duration_secs
            )));
        }
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(RunnerError::InvalidArgument(format!(
                "canvas {}x{} must have positive size",
                self.canvas_width, self.canvas_height
            )));
        }
        self.game.validate()?;
        self.ai.validate()?;
        if let Some(player) = &self.player {
            player.validate()?;
        }
        Ok(())
    }

    /// Frames needed to cover the configured duration.
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        (self.duration_secs * f64::from(self.fps)).ceil() as u64
    }
}

/// Runs one session to completion without graphics.
#[derive(Debug)]
pub struct HeadlessRunner {
    config: RunConfig,
    sim: Simulation,
    timer: ProductionTimer,
    commanders: Vec<Commander>,
    tally: ArrivalTally,
    fleets_launched: u64,
    production_ticks: u64,
}

impl HeadlessRunner {
    /// Generate the system, place the player and set up commanders.
    pub fn new(config: RunConfig) -> Result<Self, RunnerError> {
        config.validate()?;

        let mut sim = Simulation::from_seed(
            config.game.clone(),
            config.canvas_width,
            config.canvas_height,
            config.seed,
        );
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
        let home = sim.choose_player_home(&mut rng)?;

        let mut commanders = vec![Commander::new(Owner::Ai, config.ai.clone())];
        if let Some(profile) = &config.player {
            commanders.push(Commander::new(Owner::Player, profile.clone()));
        }

        tracing::info!(
            seed = config.seed,
            planets = sim.planets().len(),
            home = %home,
            "Session ready"
        );

        let timer = ProductionTimer::new(config.game.production.interval_secs, 0.0);
        Ok(Self {
            config,
            sim,
            timer,
            commanders,
            tally: ArrivalTally::default(),
            fleets_launched: 0,
            production_ticks: 0,
        })
    }

    /// The session being run.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Run one frame.
    pub fn step(&mut self) -> FrameEvents {
        let now = (self.sim.frame() + 1) as f64 / f64::from(self.config.fps);

        for _ in 0..self.timer.poll(now) {
            self.sim.production_tick();
            self.production_ticks += 1;
        }

        for commander in &mut self.commanders {
            commander.act(&mut self.sim);
        }
        self.fleets_launched += self.sim.launch_all_pending().len() as u64;

        let events = self.sim.advance_frame(now);
        for arrival in &events.arrivals {
            self.tally.record(arrival);
            tracing::info!(frame = events.frame, "{}", Notification(arrival));
        }
        events
    }

    /// Run until the duration is up or one side is wiped out, then stop
    /// the session and summarize it.
    pub fn run(mut self) -> RunSummary {
        let total = self.config.total_frames();
        while self.sim.frame() < total && self.sim.outcome() == Outcome::InProgress {
            self.step();
        }
        let outcome = self.sim.outcome();
        tracing::info!(frames = self.sim.frame(), ?outcome, "Run finished");
        self.sim.stop();
        self.summary(outcome)
    }

    fn summary(&self, outcome: Outcome) -> RunSummary {
        let neutral_planets = self
            .sim
            .planets()
            .iter()
            .filter(|p| p.owner == Owner::Neutral)
            .count();
        RunSummary {
            seed: self.config.seed,
            frames: self.sim.frame(),
            duration_secs: self.sim.now(),
            planets: self.sim.planets().len(),
            outcome,
            player: SideSummary::of(&self.sim, Owner::Player),
            ai: SideSummary::of(&self.sim, Owner::Ai),
            neutral_planets,
            player_income: self.sim.economy().income,
            production_ticks: self.production_ticks,
            fleets_launched: self.fleets_launched,
            arrivals: self.tally,
            state_hash: self.sim.state_hash(),
        }
    }
}

/// Run the same configuration `runs` times and return each final hash.
pub fn verify_runs(config: &RunConfig, runs: u32) -> Result<Vec<u64>, RunnerError> {
    (0..runs)
        .map(|_| Ok(HeadlessRunner::new(config.clone())?.run().state_hash))
        .collect()
}
