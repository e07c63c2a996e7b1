//! Fitness traits
//!
//! This module defines the fitness evaluation trait.

use crate::error::FitnessError;

/// Assigns fitness scores to candidates
///
/// Scores are real numbers. Whether higher or lower is better is reported by
/// [`is_natural`](FitnessEvaluator::is_natural), which the engine reads once per run.
///
/// Implementations are shared across the evaluation worker threads, so they must be
/// `Sync` and must not rely on being called in any particular order.
pub trait FitnessEvaluator<T>: Send + Sync {
    /// Score a single candidate
    ///
    /// `population` is the whole generation being evaluated, for fitness functions that
    /// score a candidate relative to its peers. It must not be assumed to be sorted.
    fn fitness(&self, candidate: &T, population: &[T]) -> Result<f64, FitnessError>;

    /// `true` if higher scores are better, `false` if the score is a cost
    fn is_natural(&self) -> bool;
}

impl<T, E> FitnessEvaluator<T> for Box<E>
where
    E: FitnessEvaluator<T> + ?Sized,
{
    fn fitness(&self, candidate: &T, population: &[T]) -> Result<f64, FitnessError> {
        (**self).fitness(candidate, population)
    }

    fn is_natural(&self) -> bool {
        (**self).is_natural()
    }
}
