//! # Synchronization Primitives for the Hand-off Pipeline
//!
//! ## The Problem
//!
//! ```text
//! Thread 1 (Producer):  PUT certificates
//! Thread 2 (Consumer):  TAKE certificates
//!
//! Unbounded queue:      PRODUCER RUNS AWAY → MEMORY GROWTH
//! Spin on a flag:       BURNED CORES WHILE IDLE
//! ```
//!
//! ## The Solution: Three Primitives
//!
//! ```text
//!   put:  free.acquire ─► lock ring, write tail ─► filled.release
//!   take: filled.acquire ─► lock ring, read head ─► free.release
//! ```
//!
//! `free` starts at capacity, `filled` starts at zero, and the ring lock is
//! only held for the insert/remove step. Both counting resources serve their
//! waiters in arrival order and observe a shared [`StopToken`].

mod bounded_buffer;
mod semaphore;
mod stop;

pub use bounded_buffer::{BoundedBuffer, BufferStats, PutError, DEFAULT_CAPACITY};
pub use semaphore::FairSemaphore;
pub use stop::{StopSource, StopToken};
