//! Evolution observers
//!
//! Observers are notified synchronously once per generation, in registration order.
//! A failing observer never stops the run or the notification of the others; its
//! failure is recorded and can be read back after the run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostics::PopulationData;
use crate::error::ObserverError;

/// Receives a snapshot of every generation
pub trait EvolutionObserver<T>: Send + Sync {
    /// Called after a generation has been ranked
    fn population_update(&self, data: &PopulationData<T>) -> Result<(), ObserverError>;
}

impl<T, F> EvolutionObserver<T> for F
where
    F: Fn(&PopulationData<T>) -> Result<(), ObserverError> + Send + Sync,
{
    fn population_update(&self, data: &PopulationData<T>) -> Result<(), ObserverError> {
        self(data)
    }
}

/// Handle returned when an observer is registered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObserverId(pub(crate) u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

/// One observer failing on one generation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverFailure {
    /// The observer that failed
    pub observer: ObserverId,
    /// Generation it was notified about
    pub generation: usize,
    /// Error or panic message
    pub message: String,
}

impl fmt::Display for ObserverFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed on generation {}: {}",
            self.observer, self.generation, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::individual::EvaluatedCandidate;
    use std::time::Duration;

    #[test]
    fn test_closure_observer() {
        let ranked = vec![EvaluatedCandidate::new(3u8, 3.0)];
        let data = PopulationData::from_ranked(&ranked, true, 0, 0, Duration::ZERO).unwrap();

        let observer = |data: &PopulationData<u8>| -> Result<(), ObserverError> {
            if data.best_fitness() > 2.0 {
                Err("too fit".into())
            } else {
                Ok(())
            }
        };
        let err = observer.population_update(&data).unwrap_err();
        assert_eq!(err.to_string(), "too fit");
    }

    #[test]
    fn test_failure_display() {
        let failure = ObserverFailure {
            observer: ObserverId(2),
            generation: 7,
            message: "disk full".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "observer#2 failed on generation 7: disk full"
        );
    }
}
