//! Fitness evaluation
//!
//! This module provides the fitness abstraction consumed by the engine.

pub mod traits;

pub mod prelude {
    pub use super::traits::*;
}
