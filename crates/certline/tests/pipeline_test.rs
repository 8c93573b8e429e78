//! # Pipeline Tests
//!
//! Runs the full producer → buffer → consumer pipeline on real threads and
//! checks the two report streams against each other.

use certline::{ChannelSink, LoopExit, Pipeline, PipelineConfig, PipelineError, ReportSink};
use certline_catalog::{CatalogError, ScriptedSource};
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const PRODUCER_PREFIX: &str = "OUTPUT BY PRODUCER: ";
const CONSUMER_PREFIX: &str = "OUTPUT BY CONSUMER: The retail price for model ";

fn limited(seed: u64, records: u64) -> PipelineConfig {
    PipelineConfig {
        seed: Some(seed),
        record_limit: Some(records),
        ..PipelineConfig::default()
    }
}

/// Splits the interleaved sink output into producer and consumer lines.
fn split_lines(lines: &Receiver<String>) -> (Vec<String>, Vec<String>) {
    let mut produced = Vec::new();
    let mut consumed = Vec::new();
    for line in lines.try_iter() {
        if let Some(body) = line.strip_prefix(PRODUCER_PREFIX) {
            produced.push(body.to_owned());
        } else if let Some(body) = line.strip_prefix(CONSUMER_PREFIX) {
            consumed.push(body.to_owned());
        } else {
            panic!("unexpected report line: {line}");
        }
    }
    (produced, consumed)
}

/// Panics on the first consumer line.
struct PanickingSink;

impl ReportSink for PanickingSink {
    fn append_line(&self, line: &str) {
        assert!(!line.starts_with("OUTPUT BY CONSUMER"), "sink rejected: {line}");
    }
}

fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

/// Test: every produced record is priced, in production order.
#[test]
fn test_limited_run_matches_streams() {
    const RECORDS: u64 = 500;

    let (sink, lines) = ChannelSink::new();
    let report = Pipeline::run(&limited(7, RECORDS), Arc::new(sink)).unwrap();

    assert_eq!(report.produced, RECORDS);
    assert_eq!(report.consumed, RECORDS);
    assert_eq!(report.producer_exit, LoopExit::LimitReached);
    assert_eq!(report.consumer_exit, LoopExit::LimitReached);
    assert_eq!(report.buffer.puts, RECORDS);
    assert_eq!(report.buffer.takes, RECORDS);
    assert_eq!(report.buffer.occupied, 0);

    let (produced, consumed) = split_lines(&lines);
    assert_eq!(produced.len(), consumed.len());

    let mut expected_revenue = 0u64;
    for (made, priced) in produced.iter().zip(&consumed) {
        // "M2 7QX0A Blue QWER 3 1325" vs "M2 is $1656.25"
        let fields: Vec<&str> = made.split(' ').collect();
        assert_eq!(fields.len(), 6, "malformed producer line: {made}");
        let (model, price) = (fields[0], fields[5].parse::<u64>().unwrap());

        // 25% markup: price * 1.25 == price * 125 cents
        let retail = price * 125;
        expected_revenue += retail;
        assert_eq!(
            *priced,
            format!("{model} is ${}.{:02}", retail / 100, retail % 100),
            "consumer out of step with producer"
        );
    }
    assert_eq!(report.revenue.raw(), expected_revenue);

    println!(
        "{RECORDS} records, revenue ${}, buffer {:?}",
        report.revenue, report.buffer
    );
}

/// Test: the same seed yields the same producer stream.
#[test]
fn test_seeded_runs_are_reproducible() {
    let run = |seed| {
        let (sink, lines) = ChannelSink::new();
        Pipeline::run(&limited(seed, 64), Arc::new(sink)).unwrap();
        split_lines(&lines).0
    };

    let first = run(99);
    assert_eq!(first.len(), 64);
    assert_eq!(first, run(99));
    assert_ne!(first, run(100));
}

/// Test: stopping an unbounded run unblocks both threads; records still
/// in the buffer are the only difference between the two counts.
#[test]
fn test_stop_while_running() {
    let config = PipelineConfig {
        seed: Some(1),
        ..PipelineConfig::default()
    };
    let (sink, lines) = ChannelSink::new();
    let handle = Pipeline::spawn(&config, Arc::new(sink)).unwrap();

    assert!(wait_until(Duration::from_secs(5), || handle.buffer_stats().takes >= 100));
    assert!(handle.stop());
    assert!(!handle.stop(), "second stop must report it was not first");

    let report = handle.join().unwrap();
    assert_eq!(report.producer_exit, LoopExit::Stopped);
    assert_eq!(report.consumer_exit, LoopExit::Stopped);
    assert!(report.consumed >= 100);
    assert!(report.consumed <= report.produced);

    let left = usize::try_from(report.produced - report.consumed).unwrap();
    assert_eq!(report.buffer.occupied, left);
    assert!(left <= report.buffer.capacity);

    let (produced, consumed) = split_lines(&lines);
    assert_eq!(consumed.len() as u64, report.consumed);
    // A record reported just before the stop may have been handed back.
    assert!(produced.len() as u64 >= report.produced);
    assert!(produced.len() as u64 <= report.produced + 1);
}

/// Test: a time-limited run stops on its own.
#[test]
fn test_run_for_stops_pipeline() {
    let config = PipelineConfig {
        seed: Some(3),
        run_for_ms: Some(50),
        ..PipelineConfig::default()
    };
    let (sink, lines) = ChannelSink::new();

    let start = Instant::now();
    let report = Pipeline::run(&config, Arc::new(sink)).unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_secs(10));
    assert_eq!(report.producer_exit, LoopExit::Stopped);
    assert_eq!(report.consumer_exit, LoopExit::Stopped);
    assert!(report.produced > 0);
    drop(lines);
}

/// Test: an unknown model aborts the producer, stops the consumer, and
/// surfaces as a fatal violation naming the value.
#[test]
fn test_unknown_model_is_fatal() {
    // One valid M1 record ("00000", Blue, no warranty extension), then model index 3.
    let source = ScriptedSource::new([0, 0, 0, 0, 0, 0, 0, 3], [false, false]);
    let (sink, lines) = ChannelSink::new();
    let handle =
        Pipeline::spawn_with_source(&PipelineConfig::default(), Arc::new(sink), Box::new(source))
            .unwrap();

    let err = handle.join().unwrap_err();
    assert!(err.is_fatal_violation());
    assert!(matches!(
        err,
        PipelineError::Catalog(CatalogError::UnknownModel(ref value)) if value == "index 3"
    ));
    assert!(err.to_string().contains("unknown model"));

    let (produced, _) = split_lines(&lines);
    assert_eq!(produced, vec!["M1 00000 Blue 0000 1 850".to_string()]);
}

/// Test: a limit smaller than the buffer still drains completely.
#[test]
fn test_limit_below_capacity() {
    let (sink, lines) = ChannelSink::new();
    let report = Pipeline::run(&limited(11, 2), Arc::new(sink)).unwrap();

    assert_eq!(report.produced, 2);
    assert_eq!(report.consumed, 2);
    assert_eq!(report.buffer.occupied, 0);
    let (produced, consumed) = split_lines(&lines);
    assert_eq!((produced.len(), consumed.len()), (2, 2));
}

/// Test: a consumer that panics stops the producer instead of leaving it
/// blocked on a full buffer.
#[test]
fn test_consumer_panic_releases_producer() {
    let config = PipelineConfig {
        seed: Some(1),
        ..PipelineConfig::default()
    };
    let handle = Pipeline::spawn(&config, Arc::new(PanickingSink)).unwrap();

    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let _ = done_tx.send(handle.join());
    });

    let result = done_rx
        .recv_timeout(Duration::from_secs(10))
        .expect("join still blocked after the consumer panicked");
    assert!(
        matches!(result, Err(PipelineError::TaskPanicked("consumer"))),
        "unexpected join result: {result:?}"
    );
}
