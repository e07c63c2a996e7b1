//! Cooperative interruption
//!
//! An [`InterruptHandle`] is the way another thread asks a running engine to stop.
//! The evaluation barrier and the interactive decision gate both poll it, and a run
//! that observes it ends early without any satisfied termination condition.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, cloneable interruption flag
#[derive(Clone, Debug, Default)]
pub struct InterruptHandle {
    flag: Arc<AtomicBool>,
}

impl InterruptHandle {
    /// Create a new, un-raised handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Every clone observes it.
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether the flag has been raised
    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Lower the flag
    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
