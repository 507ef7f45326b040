//! Headless session runner for simulation testing and CI verification.
//!
//! Plays complete sessions without graphics: a simulated clock drives the
//! core, scripted commanders play both sides, and each run ends with a
//! summary that can be printed or written as JSON. This enables:
//!
//! - **Balance checks**: pit commander profiles against each other
//! - **CI verification**: the same seed must always produce the same hash
//!
//! # Example
//!
//! ```bash
//! # Five minutes of game time on seed 42, summary as JSON
//! cargo run -p starfall_headless -- run --seed 42 --duration 300 --json
//!
//! # Verify determinism
//! cargo run -p starfall_headless -- verify --seed 42 --runs 5
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod commander;
pub mod report;
pub mod runner;

pub use commander::{Commander, CommanderError, CommanderProfile};
pub use report::{Notification, RunSummary};
pub use runner::{verify_runs, HeadlessRunner, RunConfig, RunnerError};
