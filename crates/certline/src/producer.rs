//! # Producer Loop
//!
//! ```text
//! loop {
//!     stop requested?        ─► exit Stopped
//!     limit reached?         ─► exit LimitReached
//!     generate certificate   ─► fatal CatalogError ends the task
//!     report line
//!     buffer.put             ─► may block; Cancelled ─► exit Stopped
//! }
//! ```
//!
//! A record reported just before a stop may never reach the consumer; the
//! cancelled put hands it back and it is dropped here.

use std::sync::Arc;

use certline_catalog::{Certificate, RandomSource, RecordGenerator};
use certline_core::{BoundedBuffer, StopToken, SyncError};

use crate::error::PipelineResult;
use crate::report::{producer_line, ReportSink};

/// Why a loop returned normally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// A stop was requested (at an iteration boundary or while blocked).
    Stopped,
    /// The configured record limit was reached.
    LimitReached,
}

/// Summary of a finished producer run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProducerOutcome {
    /// Records placed in the buffer.
    pub produced: u64,
    /// Why the loop ended.
    pub exit: LoopExit,
}

/// Generates certificates and hands them to the buffer.
pub struct ProducerLoop {
    buffer: Arc<BoundedBuffer<Certificate>>,
    generator: RecordGenerator,
    rng: Box<dyn RandomSource + Send>,
    sink: Arc<dyn ReportSink>,
    limit: Option<u64>,
}

impl ProducerLoop {
    /// Creates a producer over `buffer`.
    #[must_use]
    pub fn new(
        buffer: Arc<BoundedBuffer<Certificate>>,
        rng: Box<dyn RandomSource + Send>,
        sink: Arc<dyn ReportSink>,
        limit: Option<u64>,
    ) -> Self {
        Self {
            buffer,
            generator: RecordGenerator::new(),
            rng,
            sink,
            limit,
        }
    }

    /// Runs until stopped, the limit is reached, or generation fails.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Catalog`](crate::PipelineError::Catalog) on a
    /// broken generation rule. Cancellation is not an error.
    pub fn run(mut self, stop: &StopToken) -> PipelineResult<ProducerOutcome> {
        let mut produced = 0u64;
        tracing::info!(limit = ?self.limit, "producer started");

        let exit = loop {
            if stop.is_stopped() {
                break LoopExit::Stopped;
            }
            if self.limit.is_some_and(|limit| produced >= limit) {
                break LoopExit::LimitReached;
            }

            let certificate = match self.generator.generate(&mut *self.rng) {
                Ok(certificate) => certificate,
                Err(e) => {
                    tracing::error!(error = %e, produced, "generation rule violated");
                    return Err(e.into());
                }
            };

            self.sink.append_line(&producer_line(&certificate));

            match self.buffer.put(certificate, stop) {
                Ok(()) => produced += 1,
                Err(rejected) if rejected.error == SyncError::Cancelled => {
                    tracing::debug!(
                        certificate = %rejected.record,
                        "stop while blocked in put; record not delivered"
                    );
                    break LoopExit::Stopped;
                }
                Err(rejected) => return Err(rejected.error.into()),
            }
        };

        tracing::info!(produced, ?exit, "producer finished");
        Ok(ProducerOutcome { produced, exit })
    }
}
