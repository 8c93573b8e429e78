//! # Synchronization Error Types
//!
//! All errors that can surface from the buffer and its primitives.

use thiserror::Error;

/// Errors produced by the synchronization core.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// A blocking acquire was interrupted by a stop request.
    #[error("operation cancelled by stop request")]
    Cancelled,

    /// A buffer was requested with a capacity that cannot hold anything.
    #[error("invalid buffer capacity: {0} (must be a positive integer)")]
    InvalidCapacity(usize),

    /// A filled-slot permit was held but the slot under the read cursor was empty.
    ///
    /// Unreachable while the permit accounting is intact.
    #[error("slot ring out of step with permits: slot {index} was empty")]
    EmptySlot {
        /// Read cursor at the time of the failed take.
        index: usize,
    },
}

impl SyncError {
    /// Returns true if this error is the recoverable stop signal.
    #[inline]
    #[must_use]
    pub const fn is_cancelled(self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for synchronization operations.
pub type SyncResult<T> = Result<T, SyncError>;
