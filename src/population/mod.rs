//! Population management
//!
//! This module provides the evaluated candidate type, population ranking and the
//! candidate factory contract used to build generation zero.

pub mod factory;
pub mod individual;
#[allow(clippy::module_inception)]
pub mod population;

pub mod prelude {
    pub use super::factory::*;
    pub use super::individual::*;
    pub use super::population::*;
}
