//! Evolutionary operators and selection
//!
//! This module provides the operator and selection strategy contracts, operator
//! pipelines and the built-in fitness-based selection strategies.

pub mod selection;
pub mod traits;

pub mod prelude {
    pub use super::selection::*;
    pub use super::traits::*;
}
