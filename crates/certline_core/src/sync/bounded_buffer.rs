//! # Bounded Hand-off Buffer
//!
//! Fixed-capacity FIFO between one producer and one consumer.
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────────────────────────────┐
//!                │            BoundedBuffer             │
//!                │                                      │
//!   put ───────► │  free   (FairSemaphore, = capacity)  │
//!                │  filled (FairSemaphore, = 0)         │ ───────► take
//!                │  ring   (Mutex<SlotRing>)            │
//!                │    [ s0 | s1 | s2 | s3 ]             │
//!                │      ▲head       ▲tail               │
//!                └──────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//!
//! - `free + filled + in-flight == capacity` at every instant
//! - `0 <= len <= capacity`
//! - records leave in the order they entered, each exactly once
//!
//! Blocking happens only inside the semaphores; the ring lock is held for
//! the single slot write or read, never across a wait.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::semaphore::FairSemaphore;
use super::stop::StopToken;
use crate::error::{SyncError, SyncResult};

/// Capacity of the certificate pipeline buffer.
pub const DEFAULT_CAPACITY: usize = 4;

/// Slot array plus read/write cursors.
struct SlotRing<T> {
    slots: Box<[Option<T>]>,
    /// Next slot to read.
    head: usize,
    /// Next slot to write.
    tail: usize,
    len: usize,
}

impl<T> SlotRing<T> {
    fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Writes at the tail. The caller holds a free-slot permit.
    fn push(&mut self, value: T) {
        let previous = self.slots[self.tail].replace(value);
        debug_assert!(previous.is_none(), "free-slot permit pointed at an occupied slot");
        self.tail = (self.tail + 1) % self.slots.len();
        self.len += 1;
    }

    /// Reads at the head. The caller holds a filled-slot permit.
    fn pop(&mut self) -> SyncResult<T> {
        let index = self.head;
        let value = self.slots[index].take().ok_or(SyncError::EmptySlot { index })?;
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        Ok(value)
    }
}

/// A `put` that did not complete. The record is handed back untouched.
pub struct PutError<T> {
    /// The record that was not inserted.
    pub record: T,
    /// Why the insert did not happen.
    pub error: SyncError,
}

impl<T> PutError<T> {
    /// Recovers the record.
    #[must_use]
    pub fn into_record(self) -> T {
        self.record
    }
}

impl<T> fmt::Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PutError").field("error", &self.error).finish_non_exhaustive()
    }
}

impl<T> fmt::Display for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "put rejected: {}", self.error)
    }
}

impl<T> std::error::Error for PutError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Snapshot of buffer occupancy and traffic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Fixed capacity.
    pub capacity: usize,
    /// Records currently stored.
    pub occupied: usize,
    /// Free-slot units currently available.
    pub free_permits: usize,
    /// Filled-slot units currently available.
    pub filled_permits: usize,
    /// Completed puts.
    pub puts: u64,
    /// Completed takes.
    pub takes: u64,
    /// Puts abandoned because of a stop request.
    pub cancelled_puts: u64,
    /// Takes abandoned because of a stop request.
    pub cancelled_takes: u64,
}

#[derive(Default)]
struct Counters {
    puts: AtomicU64,
    takes: AtomicU64,
    cancelled_puts: AtomicU64,
    cancelled_takes: AtomicU64,
}

/// Fixed-capacity blocking FIFO.
///
/// Share it between exactly one producer and one consumer through an
/// `Arc`. The waiting discipline is fair, so additional callers on either
/// side are served in arrival order as well.
///
/// ## Usage
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use certline_core::{BoundedBuffer, StopSource, DEFAULT_CAPACITY};
///
/// let buffer = Arc::new(BoundedBuffer::new(DEFAULT_CAPACITY).unwrap());
/// let stop = StopSource::new();
///
/// let producer = {
///     let buffer = Arc::clone(&buffer);
///     let token = stop.token();
///     thread::spawn(move || {
///         for n in 0..10 {
///             buffer.put(n, &token).unwrap();
///         }
///     })
/// };
///
/// let token = stop.token();
/// let received: Vec<i32> = (0..10).map(|_| buffer.take(&token).unwrap()).collect();
/// producer.join().unwrap();
/// assert_eq!(received, (0..10).collect::<Vec<_>>());
/// ```
pub struct BoundedBuffer<T> {
    ring: Mutex<SlotRing<T>>,
    free: FairSemaphore,
    filled: FairSemaphore,
    capacity: usize,
    counters: Counters,
}

impl<T> BoundedBuffer<T> {
    /// Creates an empty buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> SyncResult<Self> {
        if capacity == 0 {
            return Err(SyncError::InvalidCapacity(capacity));
        }

        Ok(Self {
            ring: Mutex::new(SlotRing::new(capacity)),
            free: FairSemaphore::new("free_slots", capacity),
            filled: FairSemaphore::new("filled_slots", 0),
            capacity,
            counters: Counters::default(),
        })
    }

    /// Inserts `record` at the tail, blocking while the buffer is full.
    ///
    /// # Errors
    ///
    /// If `stop` fires before a slot frees up, returns the record inside a
    /// [`PutError`] with [`SyncError::Cancelled`]. The buffer is unchanged.
    pub fn put(&self, record: T, stop: &StopToken) -> Result<(), PutError<T>> {
        if let Err(error) = self.free.acquire(stop) {
            self.counters.cancelled_puts.fetch_add(1, Ordering::Relaxed);
            return Err(PutError { record, error });
        }

        let occupied = {
            let mut ring = self.ring.lock();
            ring.push(record);
            ring.len
        };
        self.counters.puts.fetch_add(1, Ordering::Relaxed);
        self.filled.release();

        tracing::trace!(occupied, capacity = self.capacity, "record stored");
        Ok(())
    }

    /// Removes and returns the head record, blocking while the buffer is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Cancelled`] if `stop` fires before a record
    /// arrives. The buffer is unchanged.
    pub fn take(&self, stop: &StopToken) -> SyncResult<T> {
        if let Err(error) = self.filled.acquire(stop) {
            self.counters.cancelled_takes.fetch_add(1, Ordering::Relaxed);
            return Err(error);
        }

        let (record, occupied) = {
            let mut ring = self.ring.lock();
            let record = ring.pop()?;
            (record, ring.len)
        };
        self.counters.takes.fetch_add(1, Ordering::Relaxed);
        self.free.release();

        tracing::trace!(occupied, capacity = self.capacity, "record released");
        Ok(record)
    }

    /// Fixed capacity given at construction.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.lock().len
    }

    /// Returns true if no record is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if every slot is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Threads currently blocked in `put`.
    #[must_use]
    pub fn blocked_producers(&self) -> usize {
        self.free.waiting()
    }

    /// Threads currently blocked in `take`.
    #[must_use]
    pub fn blocked_consumers(&self) -> usize {
        self.filled.waiting()
    }

    /// Returns an occupancy and traffic snapshot.
    ///
    /// Fields are read one after another; under concurrent traffic the
    /// snapshot is approximate.
    #[must_use]
    pub fn stats(&self) -> BufferStats {
        BufferStats {
            capacity: self.capacity,
            occupied: self.len(),
            free_permits: self.free.available(),
            filled_permits: self.filled.available(),
            puts: self.counters.puts.load(Ordering::Relaxed),
            takes: self.counters.takes.load(Ordering::Relaxed),
            cancelled_puts: self.counters.cancelled_puts.load(Ordering::Relaxed),
            cancelled_takes: self.counters.cancelled_takes.load(Ordering::Relaxed),
        }
    }
}

impl<T> fmt::Debug for BoundedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedBuffer")
            .field("capacity", &self.capacity)
            .field("occupied", &self.len())
            .field("free", &self.free)
            .field("filled", &self.filled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::StopSource;

    #[test]
    fn test_zero_capacity_rejected() {
        let result = BoundedBuffer::<u32>::new(0);
        assert_eq!(result.err(), Some(SyncError::InvalidCapacity(0)));
    }

    #[test]
    fn test_fifo_single_thread() {
        let stop = StopSource::new();
        let token = stop.token();
        let buffer = BoundedBuffer::new(DEFAULT_CAPACITY).unwrap();

        for n in 0..4 {
            buffer.put(n, &token).unwrap();
        }
        assert!(buffer.is_full());

        for n in 0..4 {
            assert_eq!(buffer.take(&token).unwrap(), n);
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_ring_wraps_around() {
        let stop = StopSource::new();
        let token = stop.token();
        let buffer = BoundedBuffer::new(3).unwrap();

        buffer.put(0u32, &token).unwrap();
        buffer.put(1u32, &token).unwrap();

        // Cursors lap the three slots several times.
        for round in 0..10u32 {
            buffer.put(round + 2, &token).unwrap();
            assert_eq!(buffer.take(&token).unwrap(), round);
        }
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.take(&token).unwrap(), 10);
        assert_eq!(buffer.take(&token).unwrap(), 11);
    }

    #[test]
    fn test_cancelled_put_returns_record() {
        let stop = StopSource::new();
        let token = stop.token();
        let buffer = BoundedBuffer::new(1).unwrap();

        buffer.put("kept", &token).unwrap();
        stop.request_stop();

        let err = buffer.put("returned", &token).unwrap_err();
        assert_eq!(err.error, SyncError::Cancelled);
        assert_eq!(err.into_record(), "returned");
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_stats_account_for_every_slot() {
        let stop = StopSource::new();
        let token = stop.token();
        let buffer = BoundedBuffer::new(DEFAULT_CAPACITY).unwrap();

        buffer.put(1u8, &token).unwrap();
        buffer.put(2u8, &token).unwrap();
        let _ = buffer.take(&token).unwrap();

        let stats = buffer.stats();
        assert_eq!(stats.occupied, 1);
        assert_eq!(stats.puts, 2);
        assert_eq!(stats.takes, 1);
        assert_eq!(stats.free_permits + stats.filled_permits, stats.capacity);
    }
}
