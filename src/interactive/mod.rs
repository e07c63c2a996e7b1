//! Interactive (human-in-the-loop) selection
//!
//! Instead of choosing parents by fitness, [`InteractiveSelection`] shows small groups
//! of candidates to an external decision-maker and keeps the ones they pick.
//!
//! # Overview
//!
//! - [`Console`] is the blocking contract for "present this group, return the index of
//!   the chosen member".
//! - [`DecisionGate`] implements [`Console`] for surfaces that live on another thread
//!   (a UI event loop, a network handler): the engine thread blocks on the gate while
//!   the surface polls for the presented group and records the choice.
//!
//! # Example
//!
//! ```rust,ignore
//! use evoloop::prelude::*;
//!
//! // One handle stops the run at the evaluation barrier and at the gate
//! let interrupt = InterruptHandle::new();
//! let gate = DecisionGate::new().with_interrupt(interrupt.clone());
//! let surface = gate.clone();
//! std::thread::spawn(move || loop {
//!     if let Some(pending) = surface.next_pending(Duration::from_secs(1)) {
//!         let index = ask_user(pending.group());
//!         let _ = surface.record_choice(pending.round(), index);
//!     }
//! });
//! let engine = EvolutionEngine::builder()
//!     .factory(factory)
//!     .operator(operator)
//!     .fitness(fitness)
//!     .selection(InteractiveSelection::new(gate, 4, 2)?)
//!     .interrupt(interrupt)
//!     .build()?;
//! ```

pub mod gate;
pub mod selection;
pub mod traits;

pub use gate::{DecisionGate, PendingDecision};
pub use selection::InteractiveSelection;
pub use traits::Console;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::gate::{DecisionGate, PendingDecision};
    pub use super::selection::InteractiveSelection;
    pub use super::traits::Console;
}
