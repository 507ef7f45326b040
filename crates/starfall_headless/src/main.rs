//! Headless Starfall runner.
//!
//! Runs complete sessions without graphics for balance testing and CI.
//!
//! # Usage
//!
//! ```bash
//! # One run with the default commanders
//! cargo run -p starfall_headless -- run --seed 7
//!
//! # Custom rules and profiles, JSON summary on stdout
//! cargo run -p starfall_headless -- run --config config/system.ron \
//!     --ai-profile config/cautious.ron --json
//!
//! # Same seed several times, hashes must match
//! cargo run -p starfall_headless -- verify --seed 7 --runs 5
//! ```
//!
//! Summaries go to stdout; logs go to stderr and honour `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use starfall_core::config::GameConfig;
use starfall_headless::{verify_runs, CommanderProfile, HeadlessRunner, RunConfig, RunnerError};

#[derive(Parser)]
#[command(name = "starfall_headless")]
#[command(about = "Headless Starfall session runner for testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one session and print its summary
    Run {
        #[command(flatten)]
        session: SessionArgs,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play the same session several times and compare final hashes
    Verify {
        #[command(flatten)]
        session: SessionArgs,

        /// Number of runs
        #[arg(short, long, default_value = "3")]
        runs: u32,
    },
}

#[derive(Args)]
struct SessionArgs {
    /// Generation seed
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Canvas width the system is generated for
    #[arg(long, default_value = "1280")]
    width: f64,

    /// Canvas height the system is generated for
    #[arg(long, default_value = "720")]
    height: f64,

    /// Session seconds to simulate
    #[arg(long, default_value = "300")]
    duration: f64,

    /// Simulated frames per second
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Override the production interval in seconds
    #[arg(long)]
    production_interval: Option<f64>,

    /// RON game configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RON commander profile for the player autopilot
    #[arg(long, conflicts_with = "idle_player")]
    player_profile: Option<PathBuf>,

    /// RON commander profile for the AI
    #[arg(long)]
    ai_profile: Option<PathBuf>,

    /// Leave the player side idle
    #[arg(long)]
    idle_player: bool,
}

impl SessionArgs {
    fn into_run_config(self) -> Result<RunConfig, RunnerError> {
        let mut game = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };
        if let Some(interval) = self.production_interval {
            game.production.interval_secs = interval;
        }

        let player = if self.idle_player {
            None
        } else {
            Some(match &self.player_profile {
                Some(path) => CommanderProfile::load(path)?,
                None => CommanderProfile::default(),
            })
        };
        let ai = match &self.ai_profile {
            Some(path) => CommanderProfile::load(path)?,
            None => CommanderProfile::aggressive(),
        };

        Ok(RunConfig {
            seed: self.seed,
            canvas_width: self.width,
            canvas_height: self.height,
            duration_secs: self.duration,
            fps: self.fps,
            game,
            player,
            ai,
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs to stderr; stdout carries the summary
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Run { session, json } => cmd_run(session, json),
        Commands::Verify { session, runs } => cmd_verify(session, runs),
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(%error, "Run failed");
            ExitCode::FAILURE
        }
    }
}

/// Play one session and print the summary
fn cmd_run(session: SessionArgs, json: bool) -> Result<ExitCode, RunnerError> {
    let config = session.into_run_config()?;
    let summary = HeadlessRunner::new(config)?.run();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Run the same seed several times and compare hashes
fn cmd_verify(session: SessionArgs, runs: u32) -> Result<ExitCode, RunnerError> {
    let config = session.into_run_config()?;
    tracing::info!(seed = config.seed, runs, "Verifying determinism");

    let hashes = verify_runs(&config, runs)?;
    for (run, hash) in hashes.iter().enumerate() {
        println!("Run {}: {hash:016x}", run + 1);
    }

    if hashes.windows(2).all(|w| w[0] == w[1]) {
        println!("✓ Deterministic across {runs} runs");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("✗ Runs diverged");
        Ok(ExitCode::FAILURE)
    }
}
