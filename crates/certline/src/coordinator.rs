//! # Pipeline Coordinator
//!
//! Builds the one buffer, wires both loops to it and runs each on its own
//! named thread.
//!
//! ## Lifecycle
//!
//! ```text
//! spawn ─► [producer thread] ──┐
//!       └► [consumer thread] ──┼─► join ─► PipelineReport
//!                              │
//! stop ────── StopSource ──────┘   (wakes both, even when blocked)
//! ```
//!
//! A task that fails or panics requests a stop from its own thread, so the
//! other task never waits on a buffer nobody will touch again.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use certline_catalog::{Cents, Certificate, PriceCalculator, RandomSource, SeededSource};
use certline_core::{BoundedBuffer, BufferStats, StopSource, StopToken, DEFAULT_CAPACITY};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use crate::config::PipelineConfig;
use crate::consumer::{ConsumerLoop, ConsumerOutcome};
use crate::error::{PipelineError, PipelineResult};
use crate::producer::{LoopExit, ProducerLoop, ProducerOutcome};
use crate::report::ReportSink;

const PRODUCER_TASK: &str = "producer";
const CONSUMER_TASK: &str = "consumer";

/// Totals of a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineReport {
    /// Records the producer placed in the buffer.
    pub produced: u64,
    /// Records the consumer priced.
    pub consumed: u64,
    /// Sum of reported retail prices.
    pub revenue: Cents,
    /// Why the producer stopped.
    pub producer_exit: LoopExit,
    /// Why the consumer stopped.
    pub consumer_exit: LoopExit,
    /// Buffer snapshot after both threads exited.
    pub buffer: BufferStats,
}

/// Entry points for running the pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Starts both loops with a source built from `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Spawn`] if a thread cannot be started.
    pub fn spawn(
        config: &PipelineConfig,
        sink: Arc<dyn ReportSink>,
    ) -> PipelineResult<PipelineHandle> {
        let rng = match config.seed {
            Some(seed) => SeededSource::from_seed(seed),
            None => SeededSource::from_entropy(),
        };
        Self::spawn_with_source(config, sink, Box::new(rng))
    }

    /// Starts both loops with an explicit random source.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Spawn`] if a thread cannot be started.
    pub fn spawn_with_source(
        config: &PipelineConfig,
        sink: Arc<dyn ReportSink>,
        rng: Box<dyn RandomSource + Send>,
    ) -> PipelineResult<PipelineHandle> {
        let buffer = Arc::new(BoundedBuffer::new(DEFAULT_CAPACITY)?);
        let stop = StopSource::new();
        let (finished_tx, finished_rx) = bounded::<()>(0);

        tracing::info!(
            capacity = buffer.capacity(),
            seed = ?config.seed,
            markup_bp = config.markup_bp,
            record_limit = ?config.record_limit,
            "pipeline starting"
        );

        let producer = {
            let run = ProducerLoop::new(
                Arc::clone(&buffer),
                rng,
                Arc::clone(&sink),
                config.record_limit,
            );
            spawn_task(PRODUCER_TASK, &stop, finished_tx.clone(), move |token| {
                run.run(token)
            })?
        };

        let consumer = {
            let run = ConsumerLoop::new(
                Arc::clone(&buffer),
                PriceCalculator::new(config.markup_bp),
                sink,
                config.record_limit,
            );
            spawn_task(CONSUMER_TASK, &stop, finished_tx, move |token| run.run(token))
        };

        let consumer = match consumer {
            Ok(handle) => handle,
            Err(e) => {
                stop.request_stop();
                // The producer may already be blocked in put; the stop frees it.
                let _ = producer.join();
                return Err(e);
            }
        };

        Ok(PipelineHandle {
            stop,
            buffer,
            finished: finished_rx,
            producer,
            consumer,
        })
    }

    /// Spawns, waits for `config.run_for()` (or until both loops end on
    /// their own), stops and joins.
    ///
    /// Without a time limit this returns only when a record limit is reached
    /// or a task fails.
    ///
    /// # Errors
    ///
    /// Whatever [`spawn`](Self::spawn) or [`PipelineHandle::join`] returns.
    pub fn run(
        config: &PipelineConfig,
        sink: Arc<dyn ReportSink>,
    ) -> PipelineResult<PipelineReport> {
        let handle = Self::spawn(config, sink)?;
        if let Some(run_for) = config.run_for() {
            if !handle.wait_timeout(run_for) {
                tracing::info!(?run_for, "run time elapsed, stopping");
                handle.stop();
            }
        }
        handle.join()
    }
}

/// Requests a stop when dropped unless the task completed with `Ok`.
///
/// Lives on the task's stack, so an unwinding panic drops it too.
struct StopOnFailure {
    task: &'static str,
    stop: StopSource,
    completed: bool,
}

impl Drop for StopOnFailure {
    fn drop(&mut self) {
        if !self.completed && self.stop.request_stop() {
            tracing::warn!(task = self.task, "task failed, stopping pipeline");
        }
    }
}

/// Runs `body` on a named thread.
///
/// Any exit other than `Ok`, panics included, stops the whole pipeline so
/// the other task never stays blocked on the buffer.
fn spawn_task<F, T>(
    task: &'static str,
    stop: &StopSource,
    finished: Sender<()>,
    body: F,
) -> PipelineResult<JoinHandle<PipelineResult<T>>>
where
    F: FnOnce(&StopToken) -> PipelineResult<T> + Send + 'static,
    T: Send + 'static,
{
    let stop = stop.clone();
    thread::Builder::new()
        .name(format!("certline-{task}"))
        .spawn(move || {
            // Dropped after the guard, so a failed task has already
            // requested the stop when `wait_timeout` sees it finish.
            let _finished = finished;
            let mut guard = StopOnFailure {
                task,
                stop,
                completed: false,
            };
            let result = body(&guard.stop.token());
            guard.completed = result.is_ok();
            result
        })
        .map_err(|source| PipelineError::Spawn { task, source })
}

/// A running pipeline.
pub struct PipelineHandle {
    stop: StopSource,
    buffer: Arc<BoundedBuffer<Certificate>>,
    /// Disconnects once both threads have dropped their sender.
    finished: Receiver<()>,
    producer: JoinHandle<PipelineResult<ProducerOutcome>>,
    consumer: JoinHandle<PipelineResult<ConsumerOutcome>>,
}

impl PipelineHandle {
    /// Asks both loops to stop. Returns true if this call was the first.
    pub fn stop(&self) -> bool {
        self.stop.request_stop()
    }

    /// Whether a stop was requested, by this handle or by a failing task.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Current buffer snapshot.
    #[must_use]
    pub fn buffer_stats(&self) -> BufferStats {
        self.buffer.stats()
    }

    /// Blocks until both loops have returned or `timeout` elapses.
    /// Returns true if both returned.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.finished.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => false,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        }
    }

    /// Waits for both loops and collects their totals.
    ///
    /// Does not request a stop by itself. Call [`stop`](Self::stop) first
    /// for a run without limits.
    ///
    /// # Errors
    ///
    /// The producer's error wins over the consumer's. A panicked thread
    /// maps to [`PipelineError::TaskPanicked`].
    pub fn join(self) -> PipelineResult<PipelineReport> {
        let producer = self
            .producer
            .join()
            .map_err(|_| PipelineError::TaskPanicked(PRODUCER_TASK));
        let consumer = self
            .consumer
            .join()
            .map_err(|_| PipelineError::TaskPanicked(CONSUMER_TASK));

        let producer = producer??;
        let consumer = consumer??;

        let report = PipelineReport {
            produced: producer.produced,
            consumed: consumer.consumed,
            revenue: consumer.revenue,
            producer_exit: producer.exit,
            consumer_exit: consumer.exit,
            buffer: self.buffer.stats(),
        };
        tracing::info!(
            produced = report.produced,
            consumed = report.consumed,
            revenue = %report.revenue,
            "pipeline finished"
        );
        Ok(report)
    }
}
