//! # Cooperative Cancellation
//!
//! A [`StopSource`] owns the stop decision; any number of [`StopToken`]s
//! observe it. Blocking primitives register a waker with the token before
//! they sleep, so a stop request reaches a thread parked on any condition
//! variable without the waiter ever polling.
//!
//! ```text
//!   StopSource::request_stop()
//!        │  1. stopped = true
//!        │  2. take registered wakers
//!        ▼
//!   waker.wake_on_stop()  ──►  lock waiter state, notify_all
//!                                   │
//!                                   ▼
//!                         waiter re-checks token ─► Err(Cancelled)
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::{SyncError, SyncResult};

/// Something parked on a condition variable that must be woken on stop.
///
/// Implementors must take the same lock their waiters hold between checking
/// the token and going to sleep, then notify. That ordering is what makes a
/// stop request impossible to miss.
pub(crate) trait StopWaker: Send + Sync {
    /// Wakes every thread parked on this primitive.
    fn wake_on_stop(&self);
}

struct StopState {
    stopped: AtomicBool,
    wakers: Mutex<Vec<Weak<dyn StopWaker>>>,
}

/// The owning side of a stop signal.
///
/// Cloning a source yields another handle to the same signal; any clone may
/// request the stop.
#[derive(Clone)]
pub struct StopSource {
    state: Arc<StopState>,
}

impl StopSource {
    /// Creates a new, not-yet-stopped source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(StopState {
                stopped: AtomicBool::new(false),
                wakers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Returns an observer handle for this source.
    #[must_use]
    pub fn token(&self) -> StopToken {
        StopToken {
            state: Arc::clone(&self.state),
        }
    }

    /// Requests a stop and wakes every registered waiter.
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// source was already stopped.
    pub fn request_stop(&self) -> bool {
        if self.state.stopped.swap(true, Ordering::SeqCst) {
            return false;
        }

        // The flag is set before the list is taken: a waiter registering
        // after this point is guaranteed to observe it.
        let wakers = std::mem::take(&mut *self.state.wakers.lock());
        tracing::debug!(wakers = wakers.len(), "stop requested");
        for waker in wakers.iter().filter_map(Weak::upgrade) {
            waker.wake_on_stop();
        }
        true
    }

    /// Returns true once a stop has been requested.
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state.stopped.load(Ordering::SeqCst)
    }
}

impl Default for StopSource {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StopSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopSource")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// The observing side of a stop signal.
///
/// Passed into every loop iteration and every blocking call.
#[derive(Clone)]
pub struct StopToken {
    state: Arc<StopState>,
}

impl StopToken {
    /// Returns true once the owning source has requested a stop.
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state.stopped.load(Ordering::SeqCst)
    }

    /// Loop-boundary check: `Err(Cancelled)` once stopped.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Cancelled`] if a stop has been requested.
    #[inline]
    pub fn check(&self) -> SyncResult<()> {
        if self.is_stopped() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Registers a waker to be notified on stop.
    ///
    /// Registering the same waker twice is a no-op. Dead wakers are pruned.
    pub(crate) fn register(&self, waker: Weak<dyn StopWaker>) {
        if self.is_stopped() {
            return;
        }
        let mut wakers = self.state.wakers.lock();
        wakers.retain(|existing| existing.strong_count() > 0);
        if !wakers.iter().any(|existing| Weak::ptr_eq(existing, &waker)) {
            wakers.push(waker);
        }
    }

    #[cfg(test)]
    pub(crate) fn registered(&self) -> usize {
        self.state.wakers.lock().len()
    }
}

impl fmt::Debug for StopToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopToken")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingWaker(AtomicUsize);

    impl StopWaker for CountingWaker {
        fn wake_on_stop(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_token_observes_source() {
        let source = StopSource::new();
        let token = source.token();

        assert!(!token.is_stopped());
        assert_eq!(token.check(), Ok(()));

        assert!(source.request_stop());
        assert!(token.is_stopped());
        assert_eq!(token.check(), Err(SyncError::Cancelled));
    }

    #[test]
    fn test_request_stop_is_idempotent() {
        let source = StopSource::new();
        assert!(source.request_stop());
        assert!(!source.request_stop());
        assert!(source.clone().is_stopped());
    }

    #[test]
    fn test_wakers_fire_once() {
        let source = StopSource::new();
        let token = source.token();
        let waker = Arc::new(CountingWaker(AtomicUsize::new(0)));
        let as_dyn: Arc<dyn StopWaker> = waker.clone();

        token.register(Arc::downgrade(&as_dyn));
        token.register(Arc::downgrade(&as_dyn));
        assert_eq!(token.registered(), 1);

        source.request_stop();
        source.request_stop();
        assert_eq!(waker.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dead_wakers_are_pruned() {
        let source = StopSource::new();
        let token = source.token();

        {
            let short_lived: Arc<dyn StopWaker> = Arc::new(CountingWaker(AtomicUsize::new(0)));
            token.register(Arc::downgrade(&short_lived));
        }
        let survivor: Arc<dyn StopWaker> = Arc::new(CountingWaker(AtomicUsize::new(0)));
        token.register(Arc::downgrade(&survivor));

        assert_eq!(token.registered(), 1);
    }
}
