//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a session produces identical
//! results given the same seed and the same inputs.
//!
//! # Sources of Non-determinism
//!
//! - **Unseeded randomness**: generation must draw only from the generator
//!   it is handed. Seeded sessions use `StdRng::seed_from_u64`.
//! - **Wall-clock time**: the core never reads a clock; drivers pass
//!   session time into `advance_frame`.
//! - **Combat rounding**: strengths compare and divide in fixed-point, so
//!   battles resolve identically everywhere.
//! - **Arrival order**: simultaneous arrivals resolve in launch order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use starfall_core::simulation::Simulation;

use crate::fixtures::scripted_frame;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of frames simulated.
    pub frames: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic session).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Session is non-deterministic!\n\
                 Runs: {}\n\
                 Frames: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.frames,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `frames` - Number of steps per run
/// * `setup` - Creates the initial state
/// * `step` - Advances the state by one frame
/// * `hash` - Computes the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    frames: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..frames {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        frames,
    }
}

/// Play a session twice with the scripted driver and compare final hashes.
pub fn verify_session_determinism<F>(setup_fn: F, frames: u64) -> DeterminismResult
where
    F: Fn() -> Simulation,
{
    verify_determinism(2, frames, setup_fn, scripted_frame, Simulation::state_hash)
}

/// Play `num_sims` copies of a session on separate threads and collect the
/// final hashes.
pub fn run_parallel_sessions<F>(setup_fn: F, num_sims: usize, frames: u64) -> DeterminismResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..frames {
                        scripted_frame(&mut sim);
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        frames,
    }
}

/// Step two copies of a session frame by frame and report the first frame
/// at which their hashes differ.
///
/// # Returns
///
/// `None` if the copies never diverge, `Some(frame)` otherwise (0 means
/// the initial states already differed).
pub fn find_first_divergence<F>(setup_fn: F, frames: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for frame in 1..=frames {
        scripted_frame(&mut first);
        scripted_frame(&mut second);
        if first.state_hash() != second.state_hash() {
            return Some(frame);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{duel_session, seeded_session};

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 10, || 0u64, |n| *n += 7, compute_hash);
        result.assert_deterministic();
        assert_eq!(result.unique_hashes().len(), 1);
    }

    #[test]
    fn test_detects_divergence() {
        use std::sync::atomic::{AtomicU64, Ordering};
        let counter = AtomicU64::new(0);
        let result = verify_determinism(
            2,
            1,
            || counter.fetch_add(1, Ordering::SeqCst),
            |_| {},
            compute_hash,
        );
        assert!(!result.is_deterministic);
    }

    #[test]
    fn test_duel_session_determinism() {
        verify_session_determinism(duel_session, 1_200).assert_deterministic();
    }

    #[test]
    fn test_seeded_session_determinism() {
        verify_session_determinism(|| seeded_session(42), 1_800).assert_deterministic();
    }

    #[test]
    fn test_no_divergence() {
        assert_eq!(find_first_divergence(|| seeded_session(7), 600), None);
    }

    #[test]
    fn test_parallel_sessions() {
        run_parallel_sessions(|| seeded_session(3), 4, 900).assert_deterministic();
    }
}
