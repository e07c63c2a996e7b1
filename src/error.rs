//! Error types for evoloop
//!
//! This module defines all error types used throughout the library.

use std::time::Duration;

use thiserror::Error;

/// Boxed error returned by fitness evaluators
pub type FitnessError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Boxed error returned by evolution observers
pub type ObserverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for the blocking decision protocol used by interactive selection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecisionError {
    /// The waiting thread was interrupted before a choice was recorded
    #[error("Decision wait interrupted")]
    Interrupted,

    /// No choice was recorded within the configured timeout
    #[error("No decision recorded within {0:?}")]
    TimedOut(Duration),

    /// The gate is already waiting on another decision
    #[error("Decision gate is already awaiting a choice")]
    Busy,

    /// A choice was recorded while no group was presented
    #[error("No group is awaiting a decision")]
    NoPendingDecision,

    /// A choice was recorded against a group that is no longer presented
    #[error("Decision for round {recorded} arrived but round {current} is pending")]
    StaleDecision { recorded: u64, current: u64 },

    /// The recorded index does not address a member of the presented group
    #[error("Choice {index} is outside the presented group of {group_size}")]
    OutOfRange { index: usize, group_size: usize },
}

/// Error type for selection strategies
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectionError {
    /// Invalid construction or call parameters
    #[error("Invalid selection argument: {0}")]
    InvalidArgument(String),

    /// An external collaborator broke its contract
    #[error("Selection collaborator contract violation: {0}")]
    ContractViolation(String),

    /// The external decision could not be obtained
    #[error("Decision failed: {0}")]
    Decision(#[from] DecisionError),
}

/// Top-level error type for evolution operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Bad construction or call parameters, reported before any work starts
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A fitness computation failed and the run was aborted
    #[error("Fitness evaluation failed for candidate {index}: {source}")]
    EvaluationFailure {
        /// Position of the candidate in the submitted population
        index: usize,
        /// Underlying cause
        #[source]
        source: FitnessError,
    },

    /// Operation not valid in the engine's current state
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// An external collaborator broke its contract
    #[error("Collaborator contract violation: {0}")]
    CollaboratorContractViolation(String),

    /// The evaluation thread pool could not be started
    #[error("Worker pool unavailable: {0}")]
    WorkerPool(String),
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;
