//! # Consumer Loop
//!
//! ```text
//! loop {
//!     stop requested?        ─► exit Stopped
//!     limit reached?         ─► exit LimitReached
//!     buffer.take            ─► may block; Cancelled ─► exit Stopped
//!     price certificate
//!     report line
//! }
//! ```

use std::sync::Arc;

use certline_catalog::{Cents, Certificate, PriceCalculator};
use certline_core::{BoundedBuffer, StopToken, SyncError};

use crate::error::PipelineResult;
use crate::producer::LoopExit;
use crate::report::{consumer_line, ReportSink};

/// Summary of a finished consumer run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsumerOutcome {
    /// Records taken from the buffer and priced.
    pub consumed: u64,
    /// Sum of every retail price reported.
    pub revenue: Cents,
    /// Why the loop ended.
    pub exit: LoopExit,
}

/// Takes certificates from the buffer and reports their retail price.
pub struct ConsumerLoop {
    buffer: Arc<BoundedBuffer<Certificate>>,
    pricing: PriceCalculator,
    sink: Arc<dyn ReportSink>,
    limit: Option<u64>,
}

impl ConsumerLoop {
    /// Creates a consumer over `buffer`.
    #[must_use]
    pub fn new(
        buffer: Arc<BoundedBuffer<Certificate>>,
        pricing: PriceCalculator,
        sink: Arc<dyn ReportSink>,
        limit: Option<u64>,
    ) -> Self {
        Self {
            buffer,
            pricing,
            sink,
            limit,
        }
    }

    /// Runs until stopped or the limit is reached.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Sync`](crate::PipelineError::Sync) only if
    /// the buffer reports a broken slot; cancellation is a normal exit.
    pub fn run(self, stop: &StopToken) -> PipelineResult<ConsumerOutcome> {
        let mut consumed = 0u64;
        let mut revenue = Cents::ZERO;
        tracing::info!(
            limit = ?self.limit,
            markup_bp = self.pricing.markup_bp(),
            "consumer started"
        );

        let exit = loop {
            if stop.is_stopped() {
                break LoopExit::Stopped;
            }
            if self.limit.is_some_and(|limit| consumed >= limit) {
                break LoopExit::LimitReached;
            }

            let certificate = match self.buffer.take(stop) {
                Ok(certificate) => certificate,
                Err(SyncError::Cancelled) => {
                    tracing::debug!(consumed, "stop while blocked in take");
                    break LoopExit::Stopped;
                }
                Err(e) => return Err(e.into()),
            };

            let retail = self.pricing.retail_price(&certificate);
            consumed += 1;
            revenue += retail;
            self.sink.append_line(&consumer_line(certificate.model(), retail));
        };

        tracing::info!(consumed, %revenue, ?exit, "consumer finished");
        Ok(ConsumerOutcome {
            consumed,
            revenue,
            exit,
        })
    }
}
