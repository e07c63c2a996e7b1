//! Generational evolution engine
//!
//! This module implements the generational loop: build generation zero, then
//! repeatedly evaluate, rank, notify observers, check termination and breed the next
//! generation from the elite plus selected offspring.

use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use rand::{Rng, RngCore};
use tracing::{debug, info, warn};

use crate::algorithms::observer::{EvolutionObserver, ObserverFailure, ObserverId};
use crate::diagnostics::PopulationData;
use crate::error::{DecisionError, EvoResult, EvolutionError, SelectionError};
use crate::evaluation::{self, FitnessEvaluationWorker};
use crate::fitness::traits::FitnessEvaluator;
use crate::interrupt::InterruptHandle;
use crate::operators::traits::{EvolutionaryOperator, SelectionStrategy};
use crate::population::factory::CandidateFactory;
use crate::population::individual::EvaluatedCandidate;
use crate::population::population::{elite, sort_evaluated_population};
use crate::termination::{should_continue, TerminationCondition};

/// Configuration for the evolution engine
#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    /// Evaluate fitness on the calling thread instead of the worker pool
    pub single_threaded: bool,
}

impl EngineConfig {
    /// Set single-threaded evaluation
    pub fn single_threaded(mut self, single_threaded: bool) -> Self {
        self.single_threaded = single_threaded;
        self
    }
}

/// Builder for EvolutionEngine
pub struct EvolutionEngineBuilder<T, Fac, Op, Fit, Sel> {
    config: EngineConfig,
    worker: Option<Arc<FitnessEvaluationWorker>>,
    interrupt: Option<InterruptHandle>,
    factory: Option<Fac>,
    operator: Option<Op>,
    fitness: Option<Fit>,
    selection: Option<Sel>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> EvolutionEngineBuilder<T, (), (), (), ()> {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            worker: None,
            interrupt: None,
            factory: None,
            operator: None,
            fitness: None,
            selection: None,
            _phantom: PhantomData,
        }
    }
}

impl<T> Default for EvolutionEngineBuilder<T, (), (), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Fac, Op, Fit, Sel> EvolutionEngineBuilder<T, Fac, Op, Fit, Sel> {
    /// Replace the whole configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Evaluate fitness on the calling thread
    pub fn single_threaded(mut self, single_threaded: bool) -> Self {
        self.config.single_threaded = single_threaded;
        self
    }

    /// Use a private worker instead of the process-wide shared one
    pub fn worker(mut self, worker: Arc<FitnessEvaluationWorker>) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Share an interrupt handle with the engine
    ///
    /// Pass the same handle to a [`DecisionGate`](crate::interactive::DecisionGate)
    /// with `with_interrupt` so that interrupting the engine also wakes a run blocked
    /// on a human decision. Without it the engine creates its own handle.
    pub fn interrupt(mut self, interrupt: InterruptHandle) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Set the candidate factory
    pub fn factory<NewFac>(self, factory: NewFac) -> EvolutionEngineBuilder<T, NewFac, Op, Fit, Sel>
    where
        NewFac: CandidateFactory<T>,
    {
        EvolutionEngineBuilder {
            config: self.config,
            worker: self.worker,
            interrupt: self.interrupt,
            factory: Some(factory),
            operator: self.operator,
            fitness: self.fitness,
            selection: self.selection,
            _phantom: PhantomData,
        }
    }

    /// Set the evolutionary operator
    pub fn operator<NewOp>(self, operator: NewOp) -> EvolutionEngineBuilder<T, Fac, NewOp, Fit, Sel>
    where
        NewOp: EvolutionaryOperator<T>,
    {
        EvolutionEngineBuilder {
            config: self.config,
            worker: self.worker,
            interrupt: self.interrupt,
            factory: self.factory,
            operator: Some(operator),
            fitness: self.fitness,
            selection: self.selection,
            _phantom: PhantomData,
        }
    }

    /// Set the fitness evaluator
    pub fn fitness<NewFit>(self, fitness: NewFit) -> EvolutionEngineBuilder<T, Fac, Op, NewFit, Sel>
    where
        NewFit: FitnessEvaluator<T>,
    {
        EvolutionEngineBuilder {
            config: self.config,
            worker: self.worker,
            interrupt: self.interrupt,
            factory: self.factory,
            operator: self.operator,
            fitness: Some(fitness),
            selection: self.selection,
            _phantom: PhantomData,
        }
    }

    /// Set the selection strategy
    pub fn selection<NewSel>(
        self,
        selection: NewSel,
    ) -> EvolutionEngineBuilder<T, Fac, Op, Fit, NewSel>
    where
        NewSel: SelectionStrategy<T>,
    {
        EvolutionEngineBuilder {
            config: self.config,
            worker: self.worker,
            interrupt: self.interrupt,
            factory: self.factory,
            operator: self.operator,
            fitness: self.fitness,
            selection: Some(selection),
            _phantom: PhantomData,
        }
    }
}

impl<T, Fac, Op, Fit, Sel> EvolutionEngineBuilder<T, Fac, Op, Fit, Sel>
where
    Fac: CandidateFactory<T>,
    Op: EvolutionaryOperator<T>,
    Fit: FitnessEvaluator<T>,
    Sel: SelectionStrategy<T>,
{
    /// Build the EvolutionEngine instance
    #[allow(clippy::type_complexity)]
    pub fn build(self) -> Result<EvolutionEngine<T, Fac, Op, Fit, Sel>, EvolutionError> {
        let factory = self.factory.ok_or_else(|| {
            EvolutionError::InvalidArgument("Candidate factory must be specified".to_string())
        })?;

        let operator = self.operator.ok_or_else(|| {
            EvolutionError::InvalidArgument("Evolutionary operator must be specified".to_string())
        })?;

        let fitness = self.fitness.ok_or_else(|| {
            EvolutionError::InvalidArgument("Fitness evaluator must be specified".to_string())
        })?;

        let selection = self.selection.ok_or_else(|| {
            EvolutionError::InvalidArgument("Selection strategy must be specified".to_string())
        })?;

        Ok(EvolutionEngine {
            factory,
            operator,
            fitness,
            selection,
            single_threaded: AtomicBool::new(self.config.single_threaded),
            worker: self.worker,
            observers: RwLock::new(Vec::new()),
            next_observer_id: AtomicU64::new(0),
            interrupt: self.interrupt.unwrap_or_default(),
            state: Mutex::new(RunState::Idle),
        })
    }
}

enum RunState<T> {
    Idle,
    Running,
    Finished {
        satisfied: Vec<Arc<dyn TerminationCondition<T>>>,
        observer_failures: Vec<ObserverFailure>,
    },
}

/// Marks the engine as running for the lifetime of one run
///
/// Dropping the guard without calling [`finish`](Self::finish) (an error or a panic)
/// puts the engine back into the idle state.
struct RunGuard<'a, T> {
    state: &'a Mutex<RunState<T>>,
    outcome: Option<RunState<T>>,
}

impl<'a, T> RunGuard<'a, T> {
    fn begin(state: &'a Mutex<RunState<T>>) -> EvoResult<Self> {
        let mut current = state.lock();
        if matches!(*current, RunState::Running) {
            return Err(EvolutionError::IllegalState(
                "Engine is already running".to_string(),
            ));
        }
        *current = RunState::Running;
        Ok(Self {
            state,
            outcome: None,
        })
    }

    fn finish(
        mut self,
        satisfied: Vec<Arc<dyn TerminationCondition<T>>>,
        observer_failures: Vec<ObserverFailure>,
    ) {
        self.outcome = Some(RunState::Finished {
            satisfied,
            observer_failures,
        });
    }
}

impl<T> Drop for RunGuard<'_, T> {
    fn drop(&mut self) {
        *self.state.lock() = self.outcome.take().unwrap_or(RunState::Idle);
    }
}

/// Outcome of breeding the next generation
enum Breeding<T> {
    Offspring(Vec<T>),
    Interrupted,
}

/// Generational evolution engine
///
/// The engine owns its collaborators and can be run any number of times, but only
/// one run at a time. It is `Sync`, so another thread can register observers or
/// interrupt a run through [`interrupt_handle`](Self::interrupt_handle) while it is
/// in progress.
pub struct EvolutionEngine<T, Fac, Op, Fit, Sel> {
    factory: Fac,
    operator: Op,
    fitness: Fit,
    selection: Sel,
    single_threaded: AtomicBool,
    worker: Option<Arc<FitnessEvaluationWorker>>,
    observers: RwLock<Vec<(ObserverId, Arc<dyn EvolutionObserver<T>>)>>,
    next_observer_id: AtomicU64,
    interrupt: InterruptHandle,
    state: Mutex<RunState<T>>,
}

impl<T> EvolutionEngine<T, (), (), (), ()> {
    /// Create a builder for EvolutionEngine
    pub fn builder() -> EvolutionEngineBuilder<T, (), (), (), ()> {
        EvolutionEngineBuilder::new()
    }
}

impl<T, Fac, Op, Fit, Sel> EvolutionEngine<T, Fac, Op, Fit, Sel>
where
    T: Clone + Send + Sync + 'static,
    Fac: CandidateFactory<T>,
    Op: EvolutionaryOperator<T>,
    Fit: FitnessEvaluator<T>,
    Sel: SelectionStrategy<T>,
{
    /// Run the generational loop until a termination condition is satisfied
    ///
    /// Returns the final generation ranked best-first. If the run is interrupted, the
    /// last fully evaluated generation is returned instead (empty if generation zero
    /// was never evaluated) and no termination condition is recorded as satisfied.
    ///
    /// # Errors
    ///
    /// - [`EvolutionError::InvalidArgument`] if `elite_count >= population_size` or no
    ///   conditions are given, before any work starts
    /// - [`EvolutionError::IllegalState`] if the engine is already running
    /// - [`EvolutionError::EvaluationFailure`] if a fitness computation fails
    /// - [`EvolutionError::CollaboratorContractViolation`] if a collaborator returns
    ///   the wrong number of candidates or an invalid choice
    pub fn evolve_population<R: Rng>(
        &self,
        population_size: usize,
        elite_count: usize,
        seeds: Vec<T>,
        conditions: &[Arc<dyn TerminationCondition<T>>],
        rng: &mut R,
    ) -> EvoResult<Vec<EvaluatedCandidate<T>>> {
        if population_size == 0 {
            return Err(EvolutionError::InvalidArgument(
                "Population size must be positive".to_string(),
            ));
        }
        if elite_count >= population_size {
            return Err(EvolutionError::InvalidArgument(format!(
                "Elite count must be less than population size: {} >= {}",
                elite_count, population_size
            )));
        }
        if conditions.is_empty() {
            return Err(EvolutionError::InvalidArgument(
                "At least one termination condition is required".to_string(),
            ));
        }

        let guard = RunGuard::begin(&self.state)?;
        let rng: &mut dyn RngCore = rng;
        let natural = self.fitness.is_natural();
        let start_time = Instant::now();
        let mut worker = None;
        let mut observer_failures = Vec::new();

        let mut population = self
            .factory
            .generate_initial_population(population_size, seeds, rng)?;
        check_count("Candidate factory", population_size, population.len())?;

        let mut ranked: Vec<EvaluatedCandidate<T>> = Vec::new();
        let mut generation = 0;

        loop {
            let mut evaluated = match self.evaluate(&population, &mut worker)? {
                Some(evaluated) => evaluated,
                None => return Ok(self.interrupted(guard, ranked, observer_failures, generation)),
            };
            sort_evaluated_population(&mut evaluated, natural);
            ranked = evaluated;

            let data = PopulationData::from_ranked(
                &ranked,
                natural,
                elite_count,
                generation,
                start_time.elapsed(),
            )
            .ok_or_else(|| {
                EvolutionError::IllegalState("Generation has no candidates".to_string())
            })?;

            debug!(
                generation,
                best = data.best_fitness(),
                mean = data.mean_fitness(),
                std_dev = data.fitness_std_dev(),
                "generation complete"
            );

            self.notify_observers(&data, &mut observer_failures);

            if let Some(satisfied) = should_continue(&data, conditions) {
                let reasons: Vec<&str> = satisfied.iter().map(|c| c.reason()).collect();
                info!(
                    generations = generation + 1,
                    ?reasons,
                    best = data.best_fitness(),
                    "evolution terminated"
                );
                // A late interrupt must not leak into the next run
                self.interrupt.clear();
                guard.finish(satisfied, observer_failures);
                return Ok(ranked);
            }

            if self.interrupt.is_interrupted() {
                return Ok(self.interrupted(guard, ranked, observer_failures, generation));
            }

            population = match self.breed(&ranked, population_size, elite_count, natural, rng)? {
                Breeding::Offspring(next) => next,
                Breeding::Interrupted => {
                    return Ok(self.interrupted(guard, ranked, observer_failures, generation))
                }
            };
            generation += 1;
        }
    }

    /// Run the generational loop and return the best candidate of the final generation
    ///
    /// Fails with [`EvolutionError::IllegalState`] if the run was interrupted before
    /// any generation was evaluated.
    pub fn evolve<R: Rng>(
        &self,
        population_size: usize,
        elite_count: usize,
        seeds: Vec<T>,
        conditions: &[Arc<dyn TerminationCondition<T>>],
        rng: &mut R,
    ) -> EvoResult<T> {
        self.evolve_population(population_size, elite_count, seeds, conditions, rng)?
            .into_iter()
            .next()
            .map(EvaluatedCandidate::into_candidate)
            .ok_or_else(|| {
                EvolutionError::IllegalState(
                    "Run was interrupted before any generation was evaluated".to_string(),
                )
            })
    }

    fn evaluate(
        &self,
        population: &[T],
        cached: &mut Option<Arc<FitnessEvaluationWorker>>,
    ) -> EvoResult<Option<Vec<EvaluatedCandidate<T>>>> {
        if self.is_single_threaded() {
            return evaluation::evaluate_sequential(population, &self.fitness, &self.interrupt);
        }
        let worker = self.resolve_worker(cached)?;
        worker.evaluate_all(population, &self.fitness, &self.interrupt)
    }

    /// The engine's own worker, else the shared one; looked up at most once per run
    fn resolve_worker(
        &self,
        cached: &mut Option<Arc<FitnessEvaluationWorker>>,
    ) -> EvoResult<Arc<FitnessEvaluationWorker>> {
        if let Some(worker) = cached {
            return Ok(Arc::clone(worker));
        }
        let worker = match &self.worker {
            Some(worker) => Arc::clone(worker),
            None => FitnessEvaluationWorker::shared()?,
        };
        *cached = Some(Arc::clone(&worker));
        Ok(worker)
    }

    fn breed(
        &self,
        ranked: &[EvaluatedCandidate<T>],
        population_size: usize,
        elite_count: usize,
        natural: bool,
        rng: &mut dyn RngCore,
    ) -> EvoResult<Breeding<T>> {
        let offspring_count = population_size - elite_count;
        let mut next = elite(ranked, elite_count);

        let selected = match self.selection.select(ranked, natural, offspring_count, rng) {
            Ok(selected) => selected,
            Err(SelectionError::Decision(DecisionError::Interrupted))
            | Err(SelectionError::Decision(DecisionError::TimedOut(_))) => {
                return Ok(Breeding::Interrupted)
            }
            Err(err) => return Err(selection_failure(err)),
        };
        check_count("Selection strategy", offspring_count, selected.len())?;

        let offspring = self.operator.apply(selected, rng);
        check_count("Evolutionary operator", offspring_count, offspring.len())?;

        next.extend(offspring);
        Ok(Breeding::Offspring(next))
    }

    fn notify_observers(&self, data: &PopulationData<T>, failures: &mut Vec<ObserverFailure>) {
        // Observers may register or remove observers while being notified
        let observers = self.observers.read().clone();

        let failed: Vec<ObserverFailure> = observers
            .iter()
            .filter_map(|(id, observer)| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    observer.population_update(data)
                }))
                .unwrap_or_else(|payload| {
                    Err(format!(
                        "observer panicked: {}",
                        evaluation::panic_message(payload.as_ref())
                    )
                    .into())
                });
                outcome.err().map(|err| ObserverFailure {
                    observer: *id,
                    generation: data.generation(),
                    message: err.to_string(),
                })
            })
            .collect();

        if !failed.is_empty() {
            let messages: Vec<String> = failed.iter().map(ToString::to_string).collect();
            warn!(
                generation = data.generation(),
                failed = failed.len(),
                ?messages,
                "observers failed"
            );
            failures.extend(failed);
        }
    }

    fn interrupted(
        &self,
        guard: RunGuard<'_, T>,
        ranked: Vec<EvaluatedCandidate<T>>,
        observer_failures: Vec<ObserverFailure>,
        generation: usize,
    ) -> Vec<EvaluatedCandidate<T>> {
        warn!(generation, "evolution interrupted");
        self.interrupt.clear();
        guard.finish(Vec::new(), observer_failures);
        ranked
    }
}

impl<T, Fac, Op, Fit, Sel> EvolutionEngine<T, Fac, Op, Fit, Sel> {
    /// Conditions satisfied by the last completed run
    ///
    /// Empty if that run was interrupted. Fails with [`EvolutionError::IllegalState`]
    /// before any run has completed, while a run is in progress, and after a run
    /// that failed.
    pub fn satisfied_termination_conditions(
        &self,
    ) -> EvoResult<Vec<Arc<dyn TerminationCondition<T>>>> {
        match &*self.state.lock() {
            RunState::Finished { satisfied, .. } => Ok(satisfied.clone()),
            state => Err(not_finished(state)),
        }
    }

    /// Observer failures collected during the last completed run
    ///
    /// Same state rules as
    /// [`satisfied_termination_conditions`](Self::satisfied_termination_conditions).
    pub fn observer_failures(&self) -> EvoResult<Vec<ObserverFailure>> {
        match &*self.state.lock() {
            RunState::Finished {
                observer_failures, ..
            } => Ok(observer_failures.clone()),
            state => Err(not_finished(state)),
        }
    }

    /// Register an observer; it is notified from the next generation on
    pub fn add_observer(&self, observer: Arc<dyn EvolutionObserver<T>>) -> ObserverId {
        let id = ObserverId(self.next_observer_id.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, observer));
        id
    }

    /// Unregister an observer. Returns `false` if it was not registered.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(registered, _)| *registered != id);
        observers.len() != before
    }

    /// Switch between worker-pool and calling-thread evaluation
    ///
    /// Takes effect from the next generation evaluated.
    pub fn set_single_threaded(&self, single_threaded: bool) {
        self.single_threaded.store(single_threaded, Ordering::SeqCst);
    }

    /// Whether fitness is evaluated on the calling thread
    pub fn is_single_threaded(&self) -> bool {
        self.single_threaded.load(Ordering::SeqCst)
    }

    /// Handle for interrupting a run from another thread
    ///
    /// An interrupted run returns normally with no satisfied conditions. The flag is
    /// cleared whenever a run ends normally, including when a termination condition
    /// was satisfied before the interrupt was observed.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }
}

fn not_finished<T>(state: &RunState<T>) -> EvolutionError {
    match state {
        RunState::Running => {
            EvolutionError::IllegalState("Evolution is still in progress".to_string())
        }
        _ => EvolutionError::IllegalState("Evolution has not terminated".to_string()),
    }
}

fn check_count(collaborator: &str, expected: usize, actual: usize) -> EvoResult<()> {
    if expected != actual {
        return Err(EvolutionError::CollaboratorContractViolation(format!(
            "{} returned {} candidates, expected {}",
            collaborator, actual, expected
        )));
    }
    Ok(())
}

fn selection_failure(err: SelectionError) -> EvolutionError {
    match err {
        SelectionError::InvalidArgument(msg) => EvolutionError::InvalidArgument(msg),
        SelectionError::ContractViolation(msg) => {
            EvolutionError::CollaboratorContractViolation(msg)
        }
        SelectionError::Decision(DecisionError::Busy) => EvolutionError::IllegalState(
            "Interactive selection gate is already awaiting a choice".to_string(),
        ),
        SelectionError::Decision(err) => EvolutionError::CollaboratorContractViolation(
            format!("Decision surface failed: {}", err),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FitnessError;
    use crate::operators::selection::FitnessSelection;
    use crate::termination::GenerationCount;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Identity;

    impl FitnessEvaluator<i64> for Identity {
        fn fitness(&self, candidate: &i64, _population: &[i64]) -> Result<f64, FitnessError> {
            Ok(*candidate as f64)
        }

        fn is_natural(&self) -> bool {
            true
        }
    }

    fn increment(selected: Vec<i64>, _rng: &mut dyn RngCore) -> Vec<i64> {
        selected.into_iter().map(|c| c + 1).collect()
    }

    fn zero(_rng: &mut dyn RngCore) -> i64 {
        0
    }

    fn generations(n: usize) -> Vec<Arc<dyn TerminationCondition<i64>>> {
        vec![Arc::new(GenerationCount::new(n).unwrap())]
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::default();
        assert!(!config.single_threaded);
        assert!(config.single_threaded(true).single_threaded);
    }

    #[test]
    fn test_single_threaded_run() {
        let engine = EvolutionEngine::builder()
            .factory(zero)
            .operator(increment)
            .fitness(Identity)
            .selection(FitnessSelection::truncation(0.5).unwrap())
            .single_threaded(true)
            .build()
            .unwrap();
        assert!(engine.is_single_threaded());

        let mut rng = StdRng::seed_from_u64(1);
        let ranked = engine
            .evolve_population(6, 1, Vec::new(), &generations(4), &mut rng)
            .unwrap();

        assert_eq!(ranked.len(), 6);
        // Each generation the best candidate gains one
        assert_eq!(ranked[0].fitness(), 3.0);
        assert_eq!(engine.satisfied_termination_conditions().unwrap().len(), 1);
    }

    #[test]
    fn test_query_before_run_is_illegal() {
        let engine = EvolutionEngine::builder()
            .factory(zero)
            .operator(increment)
            .fitness(Identity)
            .selection(FitnessSelection::RouletteWheel)
            .build()
            .unwrap();
        assert!(matches!(
            engine.satisfied_termination_conditions(),
            Err(EvolutionError::IllegalState(_))
        ));
        assert!(matches!(
            engine.observer_failures(),
            Err(EvolutionError::IllegalState(_))
        ));
    }

    #[test]
    fn test_operator_changing_length_is_contract_violation() {
        let engine = EvolutionEngine::builder()
            .factory(zero)
            .operator(|mut selected: Vec<i64>, _rng: &mut dyn RngCore| {
                selected.pop();
                selected
            })
            .fitness(Identity)
            .selection(FitnessSelection::RouletteWheel)
            .single_threaded(true)
            .build()
            .unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let result = engine.evolve_population(5, 1, Vec::new(), &generations(3), &mut rng);
        assert!(matches!(
            result,
            Err(EvolutionError::CollaboratorContractViolation(_))
        ));
        // A failed run does not count as terminated
        assert!(matches!(
            engine.satisfied_termination_conditions(),
            Err(EvolutionError::IllegalState(_))
        ));
    }

    #[test]
    fn test_observer_registration() {
        let engine = EvolutionEngine::builder()
            .factory(zero)
            .operator(increment)
            .fitness(Identity)
            .selection(FitnessSelection::RouletteWheel)
            .build()
            .unwrap();

        let noop = |_: &PopulationData<i64>| -> Result<(), crate::error::ObserverError> { Ok(()) };
        let first = engine.add_observer(Arc::new(noop));
        let second = engine.add_observer(Arc::new(noop));
        assert_ne!(first, second);
        assert!(engine.remove_observer(first));
        assert!(!engine.remove_observer(first));
    }

    #[test]
    fn test_builder_shares_interrupt_handle() {
        let interrupt = InterruptHandle::new();
        let engine = EvolutionEngine::builder()
            .factory(zero)
            .operator(increment)
            .fitness(Identity)
            .selection(FitnessSelection::RouletteWheel)
            .interrupt(interrupt.clone())
            .build()
            .unwrap();

        interrupt.interrupt();
        assert!(engine.interrupt_handle().is_interrupted());
        engine.interrupt_handle().clear();
        assert!(!interrupt.is_interrupted());
    }

    #[test]
    fn test_late_interrupt_cleared_on_termination() {
        let engine = EvolutionEngine::builder()
            .factory(zero)
            .operator(increment)
            .fitness(Identity)
            .selection(FitnessSelection::RouletteWheel)
            .single_threaded(true)
            .build()
            .unwrap();

        // Raised on the last generation, after evaluation but before termination
        let interrupt = engine.interrupt_handle();
        let raiser = engine.add_observer(Arc::new(
            move |data: &PopulationData<i64>| -> Result<(), crate::error::ObserverError> {
                if data.generation() == 1 {
                    interrupt.interrupt();
                }
                Ok(())
            },
        ));

        let mut rng = StdRng::seed_from_u64(1);
        engine
            .evolve_population(4, 1, Vec::new(), &generations(2), &mut rng)
            .unwrap();
        assert_eq!(engine.satisfied_termination_conditions().unwrap().len(), 1);
        assert!(!engine.interrupt_handle().is_interrupted());

        // The next run is not cut short by the stale flag
        assert!(engine.remove_observer(raiser));
        let ranked = engine
            .evolve_population(4, 1, Vec::new(), &generations(3), &mut rng)
            .unwrap();
        assert_eq!(ranked.len(), 4);
        assert_eq!(engine.satisfied_termination_conditions().unwrap().len(), 1);
    }

    #[test]
    fn test_selection_failure_mapping() {
        assert!(matches!(
            selection_failure(SelectionError::InvalidArgument("x".into())),
            EvolutionError::InvalidArgument(_)
        ));
        assert!(matches!(
            selection_failure(SelectionError::ContractViolation("x".into())),
            EvolutionError::CollaboratorContractViolation(_)
        ));
        assert!(matches!(
            selection_failure(DecisionError::Busy.into()),
            EvolutionError::IllegalState(_)
        ));
    }
}
