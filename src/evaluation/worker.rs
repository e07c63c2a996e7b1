//! Shared fitness evaluation worker
//!
//! Creating a thread pool is comparatively expensive, so one pool is shared by every
//! engine in the process. It is created lazily by the first engine that needs it and
//! lives until [`FitnessEvaluationWorker::shutdown_shared`] is called and the last
//! engine holding it is dropped. Engines can also be given a private worker.

use std::sync::Arc;

use parking_lot::Mutex;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::FitnessEvaluator;
use crate::interrupt::InterruptHandle;
use crate::population::individual::EvaluatedCandidate;

static SHARED_WORKER: Mutex<Option<Arc<FitnessEvaluationWorker>>> = parking_lot::const_mutex(None);

/// Configuration for a fitness evaluation worker
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Number of worker threads
    pub num_threads: usize,
    /// Worker threads are named `{prefix}-{index}`
    pub thread_name_prefix: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            num_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            thread_name_prefix: "fitness-worker".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Set the number of worker threads
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Set the thread name prefix
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }
}

/// Thread pool that scores candidates in parallel
pub struct FitnessEvaluationWorker {
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
    num_threads: usize,
}

impl std::fmt::Debug for FitnessEvaluationWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitnessEvaluationWorker")
            .field("num_threads", &self.num_threads)
            .finish()
    }
}

impl FitnessEvaluationWorker {
    /// Start a new worker
    #[cfg(feature = "parallel")]
    pub fn new(config: WorkerConfig) -> EvoResult<Self> {
        if config.num_threads == 0 {
            return Err(EvolutionError::InvalidArgument(
                "Worker must have at least one thread".to_string(),
            ));
        }

        let prefix = config.thread_name_prefix.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .thread_name(move |i| format!("{}-{}", prefix, i))
            .build()
            .map_err(|e| EvolutionError::WorkerPool(e.to_string()))?;

        Ok(Self {
            pool,
            num_threads: config.num_threads,
        })
    }

    /// Create a worker (sequential fallback when the `parallel` feature is disabled)
    #[cfg(not(feature = "parallel"))]
    pub fn new(config: WorkerConfig) -> EvoResult<Self> {
        if config.num_threads == 0 {
            return Err(EvolutionError::InvalidArgument(
                "Worker must have at least one thread".to_string(),
            ));
        }
        Ok(Self { num_threads: 1 })
    }

    /// Number of worker threads
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Get the process-wide worker, creating it on first use
    ///
    /// The pool is built outside the lock. If another thread installed a worker in the
    /// meantime, the freshly built one is discarded and the installed one returned.
    pub fn shared() -> EvoResult<Arc<Self>> {
        if let Some(worker) = SHARED_WORKER.lock().as_ref() {
            return Ok(Arc::clone(worker));
        }

        let created = Arc::new(Self::new(WorkerConfig::default())?);

        let mut slot = SHARED_WORKER.lock();
        match slot.as_ref() {
            Some(existing) => {
                debug!("discarding redundant fitness worker, another thread created one first");
                Ok(Arc::clone(existing))
            }
            None => {
                debug!(threads = created.num_threads, "created shared fitness worker");
                *slot = Some(Arc::clone(&created));
                Ok(created)
            }
        }
    }

    /// Release the process-wide worker
    ///
    /// Engines that already hold the worker keep using it; the next call to
    /// [`shared`](Self::shared) creates a new one. Returns `false` if there was no
    /// shared worker.
    pub fn shutdown_shared() -> bool {
        SHARED_WORKER.lock().take().is_some()
    }

    /// Score every candidate in parallel
    ///
    /// Results are returned in submission order regardless of completion order. The
    /// first failure aborts the whole barrier. Returns `Ok(None)` if `interrupt` was
    /// raised before every candidate was scored; completed results are discarded.
    #[cfg(feature = "parallel")]
    pub fn evaluate_all<T, F>(
        &self,
        population: &[T],
        fitness: &F,
        interrupt: &InterruptHandle,
    ) -> EvoResult<Option<Vec<EvaluatedCandidate<T>>>>
    where
        T: Clone + Send + Sync,
        F: FitnessEvaluator<T> + ?Sized,
    {
        let results: EvoResult<Vec<Option<EvaluatedCandidate<T>>>> = self.pool.install(|| {
            population
                .par_iter()
                .enumerate()
                .map(|(index, candidate)| {
                    if interrupt.is_interrupted() {
                        return Ok(None);
                    }
                    super::evaluate_candidate(index, candidate, population, fitness).map(Some)
                })
                .collect()
        });

        let results = results?;
        if interrupt.is_interrupted() {
            return Ok(None);
        }
        Ok(results.into_iter().collect())
    }

    /// Score every candidate (sequential fallback when the `parallel` feature is disabled)
    #[cfg(not(feature = "parallel"))]
    pub fn evaluate_all<T, F>(
        &self,
        population: &[T],
        fitness: &F,
        interrupt: &InterruptHandle,
    ) -> EvoResult<Option<Vec<EvaluatedCandidate<T>>>>
    where
        T: Clone + Send + Sync,
        F: FitnessEvaluator<T> + ?Sized,
    {
        super::evaluate_sequential(population, fitness, interrupt)
    }
}
