//! Operator traits
//!
//! This module defines the evolutionary operator and selection strategy traits.
//! Both take the random source as `&mut dyn RngCore` so that they can be used as
//! trait objects.

use rand::RngCore;

use crate::error::{EvoResult, EvolutionError, SelectionError};
use crate::population::individual::EvaluatedCandidate;

/// Evolutionary operator trait
///
/// Turns the selected candidates into the same number of offspring (mutation,
/// crossover or any combination of them).
pub trait EvolutionaryOperator<T>: Send + Sync {
    /// Produce offspring from the selected candidates
    ///
    /// Must return exactly as many candidates as it was given.
    fn apply(&self, selected: Vec<T>, rng: &mut dyn RngCore) -> Vec<T>;
}

impl<T, F> EvolutionaryOperator<T> for F
where
    F: Fn(Vec<T>, &mut dyn RngCore) -> Vec<T> + Send + Sync,
{
    fn apply(&self, selected: Vec<T>, rng: &mut dyn RngCore) -> Vec<T> {
        self(selected, rng)
    }
}

/// Selection strategy trait
///
/// Chooses the candidates that reproduce into the next generation.
pub trait SelectionStrategy<T>: Send + Sync {
    /// Select `selection_size` candidates from a ranked (best-first) population
    ///
    /// The same candidate may be selected more than once.
    fn select(
        &self,
        population: &[EvaluatedCandidate<T>],
        natural_fitness: bool,
        selection_size: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<T>, SelectionError>;
}

/// Applies a sequence of operators, each to the output of the previous one
pub struct EvolutionPipeline<T> {
    operators: Vec<Box<dyn EvolutionaryOperator<T>>>,
}

impl<T> EvolutionPipeline<T> {
    /// Create a pipeline from a non-empty list of operators
    pub fn new(operators: Vec<Box<dyn EvolutionaryOperator<T>>>) -> EvoResult<Self> {
        if operators.is_empty() {
            return Err(EvolutionError::InvalidArgument(
                "Pipeline must contain at least one operator".to_string(),
            ));
        }
        Ok(Self { operators })
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Always `false`; pipelines have at least one stage
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl<T> EvolutionaryOperator<T> for EvolutionPipeline<T> {
    fn apply(&self, selected: Vec<T>, rng: &mut dyn RngCore) -> Vec<T> {
        self.operators
            .iter()
            .fold(selected, |candidates, operator| operator.apply(candidates, rng))
    }
}
