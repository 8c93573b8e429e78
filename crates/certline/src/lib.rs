//! # CERTLINE Pipeline
//!
//! THE HAND-OFF:
//! ```text
//! ┌──────────────────┐   put    ┌──────────────────┐   take   ┌──────────────────┐
//! │ Producer thread  │ ───────► │  BoundedBuffer   │ ───────► │ Consumer thread  │
//! │ RecordGenerator  │          │  (4 slots, FIFO) │          │ PriceCalculator  │
//! └────────┬─────────┘          └──────────────────┘          └────────┬─────────┘
//!          │ OUTPUT BY PRODUCER                                        │ OUTPUT BY CONSUMER
//!          └────────────────────────► ReportSink ◄─────────────────────┘
//! ```
//!
//! Both loops run until a [`StopSource`](certline_core::StopSource) fires,
//! a record limit is reached, or the producer hits a fatal catalog error.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod consumer;
pub mod coordinator;
pub mod error;
pub mod producer;
pub mod report;

pub use config::PipelineConfig;
pub use consumer::{ConsumerLoop, ConsumerOutcome};
pub use coordinator::{Pipeline, PipelineHandle, PipelineReport};
pub use error::{PipelineError, PipelineResult};
pub use producer::{LoopExit, ProducerLoop, ProducerOutcome};
pub use report::{consumer_line, producer_line, ChannelSink, ConsoleSink, ReportSink};
