//! # FIFO-Fair Counting Semaphore
//!
//! A counting resource whose blocked waiters are served strictly in arrival
//! order. Each waiter draws a ticket; a permit is only granted to the ticket
//! at the front of the queue, so a late arrival can never overtake a thread
//! that has been waiting longer.
//!
//! ```text
//!   permits: 0      queue: [t3, t4, t5]
//!   release() ─► permits: 1 ─► notify_all
//!                t4, t5 wake, see they are not at the front, sleep again
//!                t3 wakes, takes the permit, leaves the queue
//! ```
//!
//! Waiting is cancellable through a [`StopToken`]. A cancelled waiter leaves
//! the queue without consuming a permit.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Condvar, Mutex};

use super::stop::{StopToken, StopWaker};
use crate::error::{SyncError, SyncResult};

/// Permit count and the ticket queue, guarded together.
struct SemaphoreState {
    permits: usize,
    next_ticket: u64,
    queue: VecDeque<u64>,
}

struct SemaphoreCore {
    state: Mutex<SemaphoreState>,
    changed: Condvar,
}

impl StopWaker for SemaphoreCore {
    fn wake_on_stop(&self) {
        // Holding the lock orders this notify after any waiter that has
        // checked the token but not yet parked.
        let _state = self.state.lock();
        self.changed.notify_all();
    }
}

/// A counting semaphore with first-blocked, first-served waiters.
pub struct FairSemaphore {
    core: Arc<SemaphoreCore>,
    label: &'static str,
}

impl FairSemaphore {
    /// Creates a semaphore holding `permits` units.
    ///
    /// `label` names the resource in log output.
    #[must_use]
    pub fn new(label: &'static str, permits: usize) -> Self {
        Self {
            core: Arc::new(SemaphoreCore {
                state: Mutex::new(SemaphoreState {
                    permits,
                    next_ticket: 0,
                    queue: VecDeque::new(),
                }),
                changed: Condvar::new(),
            }),
            label,
        }
    }

    /// Acquires one unit, blocking until one is available and every earlier
    /// waiter has been served.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Cancelled`] if `stop` is triggered before or
    /// while waiting. No unit is consumed in that case.
    pub fn acquire(&self, stop: &StopToken) -> SyncResult<()> {
        let mut state = self.core.state.lock();
        if stop.is_stopped() {
            return Err(SyncError::Cancelled);
        }

        if state.queue.is_empty() && state.permits > 0 {
            state.permits -= 1;
            return Ok(());
        }

        // Registered under the state lock: a stop landing after this point
        // cannot notify before this thread either sees the flag or parks.
        stop.register(self.waker());

        let ticket = state.next_ticket;
        state.next_ticket = state.next_ticket.wrapping_add(1);
        state.queue.push_back(ticket);
        tracing::debug!(
            resource = self.label,
            ticket,
            queued = state.queue.len(),
            "blocking for permit"
        );

        loop {
            if stop.is_stopped() {
                state.queue.retain(|&queued| queued != ticket);
                // Leaving the queue may put another waiter at the front.
                self.core.changed.notify_all();
                tracing::debug!(resource = self.label, ticket, "wait cancelled");
                return Err(SyncError::Cancelled);
            }

            if state.permits > 0 && state.queue.front() == Some(&ticket) {
                state.queue.pop_front();
                state.permits -= 1;
                if state.permits > 0 && !state.queue.is_empty() {
                    self.core.changed.notify_all();
                }
                tracing::debug!(resource = self.label, ticket, "permit granted");
                return Ok(());
            }

            self.core.changed.wait(&mut state);
        }
    }

    fn waker(&self) -> Weak<dyn StopWaker> {
        let core: Arc<dyn StopWaker> = Arc::clone(&self.core) as Arc<dyn StopWaker>;
        Arc::downgrade(&core)
    }

    /// Returns one unit and wakes the waiter queue.
    pub fn release(&self) {
        let mut state = self.core.state.lock();
        state.permits += 1;
        if !state.queue.is_empty() {
            self.core.changed.notify_all();
        }
    }

    /// Units currently available.
    #[must_use]
    pub fn available(&self) -> usize {
        self.core.state.lock().permits
    }

    /// Number of threads currently blocked in [`acquire`](Self::acquire).
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.core.state.lock().queue.len()
    }

    /// The label given at construction.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl fmt::Debug for FairSemaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.core.state.lock();
        f.debug_struct("FairSemaphore")
            .field("label", &self.label)
            .field("permits", &state.permits)
            .field("waiting", &state.queue.len())
            .finish()
    }
}
