//! Decision surface trait
//!
//! This module defines the [`Console`] contract between interactive selection and
//! whatever presents candidates to a human.

use crate::error::DecisionError;

/// Presents a group of candidates and reports which one was chosen
///
/// Calls block until a decision is made and may block indefinitely. The returned
/// index must address a member of `group`; interactive selection treats anything
/// else as a contract violation.
pub trait Console<T>: Send + Sync {
    /// Present `group` and return the zero-based index of the chosen member
    fn select(&self, group: &[T]) -> Result<usize, DecisionError>;
}
