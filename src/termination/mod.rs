//! Termination conditions
//!
//! This module provides the termination condition contract, the evaluator that checks
//! a list of conditions each generation, and the built-in conditions.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::diagnostics::PopulationData;
use crate::error::{EvoResult, EvolutionError};

/// Termination condition trait
pub trait TerminationCondition<T>: Send + Sync + Debug {
    /// Check if evolution should terminate
    fn should_terminate(&self, data: &PopulationData<T>) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;
}

/// Evaluate every condition against one generation
///
/// Returns `None` if evolution should continue. Otherwise returns every satisfied
/// condition, in the order given. All conditions are checked each time so that
/// simultaneous matches are all reported.
pub fn should_continue<T>(
    data: &PopulationData<T>,
    conditions: &[Arc<dyn TerminationCondition<T>>],
) -> Option<Vec<Arc<dyn TerminationCondition<T>>>> {
    let satisfied: Vec<_> = conditions
        .iter()
        .filter(|condition| condition.should_terminate(data))
        .cloned()
        .collect();

    if satisfied.is_empty() {
        None
    } else {
        Some(satisfied)
    }
}

/// Terminate once a fixed number of generations has been produced
///
/// Generation zero counts, so `GenerationCount::new(5)` stops after the generation
/// with index 4.
#[derive(Clone, Debug)]
pub struct GenerationCount(usize);

impl GenerationCount {
    /// Create a new generation count criterion
    pub fn new(generations: usize) -> EvoResult<Self> {
        if generations == 0 {
            return Err(EvolutionError::InvalidArgument(
                "Generation count must be positive".to_string(),
            ));
        }
        Ok(Self(generations))
    }

    /// Number of generations after which the condition holds
    pub fn generations(&self) -> usize {
        self.0
    }
}

impl<T> TerminationCondition<T> for GenerationCount {
    fn should_terminate(&self, data: &PopulationData<T>) -> bool {
        data.generation() + 1 >= self.0
    }

    fn reason(&self) -> &'static str {
        "Generation count reached"
    }
}

/// Terminate when the best candidate reaches a target score
#[derive(Clone, Debug)]
pub struct TargetFitness {
    /// Target fitness value
    pub target: f64,
    /// `true` if higher scores are better
    pub natural: bool,
}

impl TargetFitness {
    /// Create a new target fitness criterion
    pub fn new(target: f64, natural: bool) -> Self {
        Self { target, natural }
    }
}

impl<T> TerminationCondition<T> for TargetFitness {
    fn should_terminate(&self, data: &PopulationData<T>) -> bool {
        if self.natural {
            data.best_fitness() >= self.target
        } else {
            data.best_fitness() <= self.target
        }
    }

    fn reason(&self) -> &'static str {
        "Target fitness reached"
    }
}

/// Terminate once the run has been going for a fixed amount of time
///
/// Only checked between generations, so a run can overshoot by up to one generation.
#[derive(Clone, Debug)]
pub struct ElapsedTime(Duration);

impl ElapsedTime {
    /// Create a new elapsed time criterion
    pub fn new(max_duration: Duration) -> EvoResult<Self> {
        if max_duration.is_zero() {
            return Err(EvolutionError::InvalidArgument(
                "Duration must be positive".to_string(),
            ));
        }
        Ok(Self(max_duration))
    }
}

impl<T> TerminationCondition<T> for ElapsedTime {
    fn should_terminate(&self, data: &PopulationData<T>) -> bool {
        data.elapsed() >= self.0
    }

    fn reason(&self) -> &'static str {
        "Elapsed time limit reached"
    }
}

#[derive(Clone, Copy, Debug)]
struct StagnationState {
    best_fitness: f64,
    improved_at: usize,
}

/// Terminate when the best score has not improved for a number of generations
///
/// Keeps track of the best score seen so far. Seeing generation zero again resets
/// the tracking, so one instance can be reused across runs.
#[derive(Debug)]
pub struct Stagnation {
    generation_limit: usize,
    natural: bool,
    state: Mutex<Option<StagnationState>>,
}

impl Stagnation {
    /// Create a new stagnation criterion
    pub fn new(generation_limit: usize, natural: bool) -> EvoResult<Self> {
        if generation_limit == 0 {
            return Err(EvolutionError::InvalidArgument(
                "Stagnation generation limit must be positive".to_string(),
            ));
        }
        Ok(Self {
            generation_limit,
            natural,
            state: Mutex::new(None),
        })
    }
}

impl<T> TerminationCondition<T> for Stagnation {
    fn should_terminate(&self, data: &PopulationData<T>) -> bool {
        let mut state = self.state.lock();
        let fitness = data.best_fitness();

        let current = match *state {
            Some(current) if data.generation() != 0 => current,
            _ => {
                *state = Some(StagnationState {
                    best_fitness: fitness,
                    improved_at: data.generation(),
                });
                return false;
            }
        };

        let improved = if self.natural {
            fitness > current.best_fitness
        } else {
            fitness < current.best_fitness
        };

        if improved {
            *state = Some(StagnationState {
                best_fitness: fitness,
                improved_at: data.generation(),
            });
            false
        } else {
            data.generation().saturating_sub(current.improved_at) >= self.generation_limit
        }
    }

    fn reason(&self) -> &'static str {
        "Fitness stagnation detected"
    }
}

/// Terminate on request from another thread
///
/// Unlike interrupting the engine, this stops at the end of the current generation
/// and is reported as a satisfied condition.
#[derive(Debug, Default)]
pub struct UserAbort {
    aborted: AtomicBool,
}

impl UserAbort {
    /// Create a new, un-aborted criterion
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    /// Check whether termination was requested
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Re-arm the criterion
    pub fn reset(&self) {
        self.aborted.store(false, Ordering::SeqCst);
    }
}

impl<T> TerminationCondition<T> for UserAbort {
    fn should_terminate(&self, _data: &PopulationData<T>) -> bool {
        self.is_aborted()
    }

    fn reason(&self) -> &'static str {
        "Aborted by user"
    }
}

pub mod prelude {
    pub use super::{
        should_continue, ElapsedTime, GenerationCount, Stagnation, TargetFitness,
        TerminationCondition, UserAbort,
    };
}
