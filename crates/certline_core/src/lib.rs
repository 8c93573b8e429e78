//! # CERTLINE Core
//!
//! Synchronization kernel for the certificate hand-off pipeline:
//! - One producer thread, one consumer thread
//! - A single fixed-capacity buffer between them
//! - Every blocking wait can be interrupted by a stop request
//!
//! ## Architecture Rules
//!
//! 1. **No polling** - waiters sleep on a condition variable and are woken
//!    only by a release or a stop request
//! 2. **First blocked, first served** - counting resources hand out permits
//!    in arrival order
//! 3. **Short critical sections** - the slot lock is never held while
//!    waiting for a permit
//!
//! ## Example
//!
//! ```rust
//! use certline_core::{BoundedBuffer, StopSource};
//!
//! let buffer = BoundedBuffer::new(4).unwrap();
//! let stop = StopSource::new();
//! let token = stop.token();
//!
//! buffer.put("first", &token).unwrap();
//! assert_eq!(buffer.take(&token).unwrap(), "first");
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod sync;

pub use error::{SyncError, SyncResult};
pub use sync::{
    BoundedBuffer, BufferStats, FairSemaphore, PutError, StopSource, StopToken, DEFAULT_CAPACITY,
};
