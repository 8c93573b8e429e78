//! # Report Sinks
//!
//! Both loops emit one line per record through a [`ReportSink`]. The sink
//! is the only output path; nothing in the pipeline writes to stdout
//! directly.

use std::io::Write;

use certline_catalog::{Cents, Certificate, Model};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Prefix of every producer line.
pub const PRODUCER_PREFIX: &str = "OUTPUT BY PRODUCER: ";

/// Prefix of every consumer line.
pub const CONSUMER_PREFIX: &str = "OUTPUT BY CONSUMER: ";

/// Appends report lines somewhere.
pub trait ReportSink: Send + Sync {
    /// Appends one line. `line` carries no trailing newline.
    fn append_line(&self, line: &str);
}

/// `OUTPUT BY PRODUCER: M2 7QX0A Blue QWER 3 1325`
#[must_use]
pub fn producer_line(certificate: &Certificate) -> String {
    format!("{PRODUCER_PREFIX}{certificate}")
}

/// `OUTPUT BY CONSUMER: The retail price for model M2 is $1656.25`
#[must_use]
pub fn consumer_line(model: Model, retail: Cents) -> String {
    format!("{CONSUMER_PREFIX}The retail price for model {model} is ${retail}")
}

/// Writes lines to standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Creates a console sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ReportSink for ConsoleSink {
    fn append_line(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{line}") {
            tracing::warn!(error = %e, "failed to write report line");
        }
    }
}

/// Forwards lines over a crossbeam channel.
///
/// Lines sent after the receiver is dropped are discarded.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    sender: Sender<String>,
}

impl ChannelSink {
    /// Creates a sink and the receiver that collects its lines.
    #[must_use]
    pub fn new() -> (Self, Receiver<String>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl ReportSink for ChannelSink {
    fn append_line(&self, line: &str) {
        if self.sender.send(line.to_owned()).is_err() {
            tracing::trace!("report receiver dropped; line discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certline_catalog::{Code, Color, Serial};

    #[test]
    fn test_line_formats() {
        let cert = Certificate::new(
            Model::M2,
            Serial::from_bytes(*b"7QX0A").unwrap(),
            Color::Blue,
            Code::from_bytes(*b"QWER").unwrap(),
            3,
        )
        .unwrap();

        assert_eq!(producer_line(&cert), "OUTPUT BY PRODUCER: M2 7QX0A Blue QWER 3 1325");
        assert_eq!(
            consumer_line(Model::M2, Cents::from_raw(165_625)),
            "OUTPUT BY CONSUMER: The retail price for model M2 is $1656.25"
        );
    }

    #[test]
    fn test_channel_sink_preserves_order() {
        let (sink, receiver) = ChannelSink::new();
        sink.append_line("one");
        sink.append_line("two");
        assert_eq!(receiver.try_iter().collect::<Vec<_>>(), vec!["one", "two"]);

        drop(receiver);
        sink.append_line("ignored");
    }
}
