//! Evaluated candidate type
//!
//! This module provides the immutable pairing of a candidate with its fitness score.

use serde::{Deserialize, Serialize};

/// A candidate together with the fitness score it was assigned
///
/// Immutable once built. Each generation produces fresh values rather than
/// updating scores in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedCandidate<T> {
    candidate: T,
    fitness: f64,
}

impl<T> EvaluatedCandidate<T> {
    /// Pair a candidate with its score
    pub fn new(candidate: T, fitness: f64) -> Self {
        Self { candidate, fitness }
    }

    /// The evaluated candidate
    pub fn candidate(&self) -> &T {
        &self.candidate
    }

    /// The fitness score
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Take the candidate out
    pub fn into_candidate(self) -> T {
        self.candidate
    }

    /// Check if this candidate scores better than another under the given convention
    pub fn is_better_than(&self, other: &Self, natural_fitness: bool) -> bool {
        if natural_fitness {
            self.fitness > other.fitness
        } else {
            self.fitness < other.fitness
        }
    }
}
