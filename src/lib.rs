//! # evoloop
//!
//! A generational evolutionary-algorithm engine.
//!
//! The engine runs the classic loop: build a population, score it, rank it, check
//! termination and breed the next generation from the elite and the selected
//! offspring. Candidates are opaque to the engine; the factory, operators, fitness
//! function and selection strategy are supplied by the caller.
//!
//! ## Core Concepts
//!
//! - **Shared evaluation pool**: fitness is scored in parallel on a process-wide
//!   thread pool that every engine reuses, or on the calling thread in
//!   single-threaded mode
//! - **Stable ranking**: populations are sorted best-first for natural (higher is
//!   better) and inverted (lower is better) fitness, and ties keep their order
//! - **Interactive selection**: parents can be chosen by a human through a blocking
//!   decision gate driven from another thread
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use evoloop::prelude::*;
//! use rand::SeedableRng;
//! use std::sync::Arc;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let engine = EvolutionEngine::builder()
//!     .factory(|rng: &mut dyn RngCore| rng.gen_range(0..100i64))
//!     .operator(|selected: Vec<i64>, _rng: &mut dyn RngCore| {
//!         selected.into_iter().map(|c| c + 1).collect::<Vec<_>>()
//!     })
//!     .fitness(MyFitness)
//!     .selection(FitnessSelection::tournament(0.8)?)
//!     .build()?;
//!
//! let conditions: Vec<Arc<dyn TerminationCondition<i64>>> =
//!     vec![Arc::new(GenerationCount::new(100)?)];
//! let best = engine.evolve(100, 5, Vec::new(), &conditions, &mut rng)?;
//! ```

pub mod algorithms;
pub mod diagnostics;
pub mod error;
pub mod evaluation;
pub mod fitness;
pub mod interactive;
pub mod interrupt;
pub mod operators;
pub mod population;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::evaluation::{evaluate_sequential, FitnessEvaluationWorker, WorkerConfig};
    pub use crate::fitness::prelude::*;
    pub use crate::interactive::prelude::*;
    pub use crate::interrupt::InterruptHandle;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::termination::prelude::*;
    pub use rand::RngCore;
}
