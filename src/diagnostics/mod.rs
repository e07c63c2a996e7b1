//! Diagnostics and statistics
//!
//! This module provides the per-generation snapshot handed to observers and
//! termination conditions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::population::individual::EvaluatedCandidate;

/// Running fitness statistics (Welford's online algorithm)
///
/// Numerically stable in one pass, even for large populations with large scores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessStatistics {
    count: usize,
    mean: f64,
    m2: f64,
}

impl FitnessStatistics {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate every value of an iterator
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut stats = Self::new();
        for value in values {
            stats.push(value);
        }
        stats
    }

    /// Add one value
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Number of values seen
    pub fn count(&self) -> usize {
        self.count
    }

    /// Arithmetic mean (0.0 when empty)
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance (0.0 when empty)
    pub fn population_variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Population standard deviation (0.0 when empty)
    pub fn population_std_dev(&self) -> f64 {
        self.population_variance().sqrt()
    }
}

/// Snapshot of one generation
///
/// Created once per generation from the ranked population and handed to observers
/// and termination conditions. The engine does not keep it after dispatch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationData<T> {
    best_candidate: T,
    best_fitness: f64,
    worst_fitness: f64,
    mean_fitness: f64,
    fitness_std_dev: f64,
    natural_fitness: bool,
    population_size: usize,
    elite_count: usize,
    generation: usize,
    elapsed: Duration,
}

impl<T: Clone> PopulationData<T> {
    /// Compute the snapshot of a ranked (best-first) population
    ///
    /// Returns `None` for an empty population.
    pub fn from_ranked(
        ranked: &[EvaluatedCandidate<T>],
        natural_fitness: bool,
        elite_count: usize,
        generation: usize,
        elapsed: Duration,
    ) -> Option<Self> {
        let best = ranked.first()?;
        let worst = ranked.last()?;
        let stats = FitnessStatistics::from_values(ranked.iter().map(|e| e.fitness()));

        Some(Self {
            best_candidate: best.candidate().clone(),
            best_fitness: best.fitness(),
            worst_fitness: worst.fitness(),
            mean_fitness: stats.mean(),
            fitness_std_dev: stats.population_std_dev(),
            natural_fitness,
            population_size: ranked.len(),
            elite_count,
            generation,
            elapsed,
        })
    }
}

impl<T> PopulationData<T> {
    /// The fittest candidate of this generation
    pub fn best_candidate(&self) -> &T {
        &self.best_candidate
    }

    /// Score of the fittest candidate
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Score of the least fit candidate
    pub fn worst_fitness(&self) -> f64 {
        self.worst_fitness
    }

    /// Mean score
    pub fn mean_fitness(&self) -> f64 {
        self.mean_fitness
    }

    /// Population standard deviation of the scores
    pub fn fitness_std_dev(&self) -> f64 {
        self.fitness_std_dev
    }

    /// `true` if higher scores are better
    pub fn is_natural_fitness(&self) -> bool {
        self.natural_fitness
    }

    /// Number of candidates
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Number of candidates carried over unchanged into the next generation
    pub fn elite_count(&self) -> usize {
        self.elite_count
    }

    /// Zero-based generation index
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Wall-clock time since the run started
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

pub mod prelude {
    pub use super::{FitnessStatistics, PopulationData};
}
