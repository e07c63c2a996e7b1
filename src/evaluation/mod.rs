//! Fitness evaluation barrier
//!
//! This module scores a whole generation, either on the calling thread or on the
//! shared [`FitnessEvaluationWorker`]. In both cases the results come back in
//! submission order and the caller does not proceed until every score is known.

pub mod worker;

use std::panic::{self, AssertUnwindSafe};

use crate::error::{EvoResult, EvolutionError, FitnessError};
use crate::fitness::traits::FitnessEvaluator;
use crate::interrupt::InterruptHandle;
use crate::population::individual::EvaluatedCandidate;

pub use worker::{FitnessEvaluationWorker, WorkerConfig};

/// Score one candidate, turning panics and NaN scores into evaluation failures
pub(crate) fn evaluate_candidate<T, F>(
    index: usize,
    candidate: &T,
    population: &[T],
    fitness: &F,
) -> EvoResult<EvaluatedCandidate<T>>
where
    T: Clone,
    F: FitnessEvaluator<T> + ?Sized,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| fitness.fitness(candidate, population)))
        .unwrap_or_else(|payload| Err(panic_error(payload)));

    match outcome {
        Ok(score) if score.is_nan() => Err(EvolutionError::EvaluationFailure {
            index,
            source: "fitness evaluator returned NaN".into(),
        }),
        Ok(score) => Ok(EvaluatedCandidate::new(candidate.clone(), score)),
        Err(source) => Err(EvolutionError::EvaluationFailure { index, source }),
    }
}

fn panic_error(payload: Box<dyn std::any::Any + Send>) -> FitnessError {
    format!("fitness evaluator panicked: {}", panic_message(payload.as_ref())).into()
}

/// Best-effort text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

/// Score every candidate on the calling thread
///
/// Returns `Ok(None)` if `interrupt` is raised before every candidate was scored;
/// the partial results are discarded.
pub fn evaluate_sequential<T, F>(
    population: &[T],
    fitness: &F,
    interrupt: &InterruptHandle,
) -> EvoResult<Option<Vec<EvaluatedCandidate<T>>>>
where
    T: Clone,
    F: FitnessEvaluator<T> + ?Sized,
{
    let mut evaluated = Vec::with_capacity(population.len());
    for (index, candidate) in population.iter().enumerate() {
        if interrupt.is_interrupted() {
            return Ok(None);
        }
        evaluated.push(evaluate_candidate(index, candidate, population, fitness)?);
    }
    Ok(Some(evaluated))
}
