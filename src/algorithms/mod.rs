//! Evolutionary algorithms
//!
//! This module provides the generational evolution engine and its observer contract.

pub mod engine;
pub mod observer;

pub mod prelude {
    pub use super::engine::*;
    pub use super::observer::*;
}
