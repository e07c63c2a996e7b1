//! Blocking decision gate
//!
//! A [`DecisionGate`] is a single-slot rendezvous between the engine thread, which
//! presents a group and waits, and a decision surface on another thread, which picks
//! up the group and records a choice. Every presented group gets a new round number,
//! so a late or duplicated choice can never be applied to the wrong group.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::DecisionError;
use crate::interactive::traits::Console;
use crate::interrupt::InterruptHandle;

/// How often a waiting thread re-checks an attached [`InterruptHandle`]
const INTERRUPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// A group awaiting a decision
#[derive(Clone, Debug, PartialEq)]
pub struct PendingDecision<T> {
    round: u64,
    group: Vec<T>,
}

impl<T> PendingDecision<T> {
    /// Round number to pass back to [`DecisionGate::record_choice`]
    pub fn round(&self) -> u64 {
        self.round
    }

    /// The presented candidates
    pub fn group(&self) -> &[T] {
        &self.group
    }

    /// Take the presented candidates
    pub fn into_group(self) -> Vec<T> {
        self.group
    }
}

#[derive(Debug)]
struct GateState<T> {
    round: u64,
    pending: Option<Vec<T>>,
    choice: Option<usize>,
    interrupted: bool,
}

impl<T> GateState<T> {
    fn reset(&mut self) {
        self.pending = None;
        self.choice = None;
        self.interrupted = false;
    }
}

#[derive(Debug)]
struct GateShared<T> {
    state: Mutex<GateState<T>>,
    changed: Condvar,
}

/// Console backed by a condition variable
///
/// Clones share the same slot: hand one clone to the interactive selection strategy
/// and another to the decision surface. Timeout and interrupt settings belong to the
/// handle they were set on and apply when that handle waits in [`Console::select`].
///
/// A gate serves one selection at a time; presenting a second group while one is
/// pending fails with [`DecisionError::Busy`].
#[derive(Debug)]
pub struct DecisionGate<T> {
    shared: Arc<GateShared<T>>,
    timeout: Option<Duration>,
    interrupt: Option<InterruptHandle>,
}

impl<T> Clone for DecisionGate<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            timeout: self.timeout,
            interrupt: self.interrupt.clone(),
        }
    }
}

impl<T> Default for DecisionGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DecisionGate<T> {
    /// Create an idle gate
    pub fn new() -> Self {
        Self {
            shared: Arc::new(GateShared {
                state: Mutex::new(GateState {
                    round: 0,
                    pending: None,
                    choice: None,
                    interrupted: false,
                }),
                changed: Condvar::new(),
            }),
            timeout: None,
            interrupt: None,
        }
    }

    /// Give up waiting for a choice after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Stop waiting for a choice once `interrupt` is raised
    pub fn with_interrupt(mut self, interrupt: InterruptHandle) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Whether a group is currently awaiting a decision
    pub fn is_pending(&self) -> bool {
        self.shared.state.lock().pending.is_some()
    }

    /// Record the choice for the group presented in `round`
    ///
    /// Invalid choices are rejected and leave the waiting thread waiting.
    pub fn record_choice(&self, round: u64, index: usize) -> Result<(), DecisionError> {
        let mut state = self.shared.state.lock();

        let group_size = match state.pending.as_ref() {
            Some(group) => group.len(),
            None => return Err(DecisionError::NoPendingDecision),
        };
        if round != state.round {
            return Err(DecisionError::StaleDecision {
                recorded: round,
                current: state.round,
            });
        }
        if state.choice.is_some() {
            return Err(DecisionError::NoPendingDecision);
        }
        if index >= group_size {
            return Err(DecisionError::OutOfRange { index, group_size });
        }

        state.choice = Some(index);
        self.shared.changed.notify_all();
        Ok(())
    }

    /// Wake the waiting thread with [`DecisionError::Interrupted`]
    ///
    /// Returns `false` if nothing was pending.
    pub fn interrupt(&self) -> bool {
        let mut state = self.shared.state.lock();
        if state.pending.is_none() {
            return false;
        }
        state.interrupted = true;
        self.shared.changed.notify_all();
        true
    }

    fn is_interrupted(&self, state: &GateState<T>) -> bool {
        state.interrupted
            || self
                .interrupt
                .as_ref()
                .map_or(false, InterruptHandle::is_interrupted)
    }

    /// How long the next wait may last; `None` means until notified
    fn next_wait(&self, deadline: Option<Instant>, now: Instant) -> Option<Duration> {
        let until_deadline = deadline.map(|d| d.saturating_duration_since(now));
        match (until_deadline, self.interrupt.is_some()) {
            (Some(remaining), true) => Some(remaining.min(INTERRUPT_POLL_INTERVAL)),
            (Some(remaining), false) => Some(remaining),
            (None, true) => Some(INTERRUPT_POLL_INTERVAL),
            (None, false) => None,
        }
    }
}

impl<T: Clone> DecisionGate<T> {
    /// The group awaiting a decision, if any
    pub fn pending(&self) -> Option<PendingDecision<T>> {
        let state = self.shared.state.lock();
        Self::undecided(&state)
    }

    /// Block until a group awaits a decision, or `timeout` elapses
    pub fn next_pending(&self, timeout: Duration) -> Option<PendingDecision<T>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        loop {
            if let Some(pending) = Self::undecided(&state) {
                return Some(pending);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            self.shared.changed.wait_for(&mut state, deadline - now);
        }
    }

    fn undecided(state: &GateState<T>) -> Option<PendingDecision<T>> {
        match (&state.pending, state.choice) {
            (Some(group), None) => Some(PendingDecision {
                round: state.round,
                group: group.clone(),
            }),
            _ => None,
        }
    }
}

impl<T: Clone + Send> Console<T> for DecisionGate<T> {
    fn select(&self, group: &[T]) -> Result<usize, DecisionError> {
        let mut state = self.shared.state.lock();
        if state.pending.is_some() {
            return Err(DecisionError::Busy);
        }

        state.round += 1;
        state.pending = Some(group.to_vec());
        state.choice = None;
        state.interrupted = false;
        self.shared.changed.notify_all();

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let outcome = loop {
            if let Some(choice) = state.choice {
                break Ok(choice);
            }
            if self.is_interrupted(&state) {
                break Err(DecisionError::Interrupted);
            }
            let now = Instant::now();
            if let (Some(deadline), Some(timeout)) = (deadline, self.timeout) {
                if now >= deadline {
                    break Err(DecisionError::TimedOut(timeout));
                }
            }
            // Wake-ups may be spurious; the loop re-checks every exit condition
            match self.next_wait(deadline, now) {
                Some(wait) => {
                    self.shared.changed.wait_for(&mut state, wait);
                }
                None => self.shared.changed.wait(&mut state),
            }
        };

        state.reset();
        self.shared.changed.notify_all();
        outcome
    }
}
