//! Reporter behaviour: batching, dedup across the wire, swap-then-post,
//! timer scheduling, no-transport retention.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use typetrace_core::config::RuntimeConfig;
use typetrace_core::errors::RuntimeError;
use typetrace_core::model::{BatchRecord, ObservationMetadata};
use typetrace_runtime::reporter::{BatchTransport, Reporter};
use typetrace_runtime::serialize;
use typetrace_runtime::HostValue;

/// Captures every posted batch.
#[derive(Default)]
struct CapturingTransport {
    batches: Mutex<Vec<Value>>,
}

impl CapturingTransport {
    fn batches(&self) -> Vec<Value> {
        self.batches.lock().unwrap().clone()
    }
}

impl BatchTransport for CapturingTransport {
    fn post(&self, batch: &Value) -> Result<(), RuntimeError> {
        self.batches.lock().unwrap().push(batch.clone());
        Ok(())
    }
}

/// Always fails, for loss-tolerance checks.
struct FailingTransport;

impl BatchTransport for FailingTransport {
    fn post(&self, _batch: &Value) -> Result<(), RuntimeError> {
        Err(RuntimeError::Transport { reason: "unreachable".into() })
    }
}

fn config(flush_ms: u64) -> RuntimeConfig {
    RuntimeConfig {
        collector_url: "http://127.0.0.1:1/ingest".into(),
        flush_interval_ms: flush_ms,
        max_buffer_keys: 100,
        request_timeout_ms: 100,
    }
}

fn record_value(reporter: &Arc<Reporter>, filename: &str, offset: u64, value: &HostValue) {
    let surrogate = serialize::surrogate(value);
    let serialised = serde_json::to_string(&surrogate).unwrap();
    reporter.record(
        filename,
        offset,
        surrogate,
        serialised,
        None,
        &ObservationMetadata::default(),
    );
}

#[test]
fn explicit_flush_posts_wire_format_batch() {
    let transport = Arc::new(CapturingTransport::default());
    let reporter = Reporter::with_transport(config(60_000), Some(transport.clone()));

    record_value(&reporter, "a.ts", 11, &HostValue::Number(1.0));
    record_value(&reporter, "a.ts", 11, &HostValue::Number(2.0));
    record_value(&reporter, "a.ts", 13, &HostValue::str("x"));

    let flushed = reporter.flush_now();
    assert_eq!(flushed, 2, "two keys drained");
    assert_eq!(reporter.buffered_keys(), 0);

    let batches = transport.batches();
    assert_eq!(batches.len(), 1);
    let records: Vec<BatchRecord> = serde_json::from_value(batches[0].clone()).unwrap();
    assert_eq!(records.len(), 2);

    let (filename, offset, values, _) = records[0].clone().into_parts();
    assert_eq!((filename.as_str(), offset), ("a.ts", 11));
    assert_eq!(values.len(), 2, "distinct values for the key");
}

#[test]
fn duplicate_values_collapse_before_the_wire() {
    let transport = Arc::new(CapturingTransport::default());
    let reporter = Reporter::with_transport(config(60_000), Some(transport.clone()));

    for _ in 0..5 {
        record_value(&reporter, "a.ts", 11, &HostValue::str("success"));
    }
    reporter.flush_now();

    let records: Vec<BatchRecord> =
        serde_json::from_value(transport.batches()[0].clone()).unwrap();
    let (_, _, values, _) = records[0].clone().into_parts();
    assert_eq!(values.len(), 1);
}

#[test]
fn observations_after_flush_accumulate_into_next_batch() {
    let transport = Arc::new(CapturingTransport::default());
    let reporter = Reporter::with_transport(config(60_000), Some(transport.clone()));

    record_value(&reporter, "a.ts", 1, &HostValue::Number(1.0));
    reporter.flush_now();
    record_value(&reporter, "a.ts", 1, &HostValue::Number(2.0));
    reporter.flush_now();

    let batches = transport.batches();
    assert_eq!(batches.len(), 2);
}

#[test]
fn timer_flushes_without_explicit_drain() {
    let transport = Arc::new(CapturingTransport::default());
    let reporter = Reporter::with_transport(config(30), Some(transport.clone()));

    record_value(&reporter, "timer.ts", 1, &HostValue::Bool(true));
    assert_eq!(reporter.buffered_keys(), 1);

    // Single-shot timer fires once after the configured period.
    for _ in 0..100 {
        if !transport.batches().is_empty() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(transport.batches().len(), 1);
    assert_eq!(reporter.buffered_keys(), 0);
}

#[test]
fn no_transport_retains_buffer() {
    let reporter = Reporter::with_transport(config(60_000), None);

    record_value(&reporter, "a.ts", 1, &HostValue::Number(1.0));
    assert_eq!(reporter.flush_now(), 0);
    assert_eq!(reporter.buffered_keys(), 1, "buffer retained without transport");
}

#[test]
fn failed_post_loses_batch_without_retry() {
    let reporter = Reporter::with_transport(config(60_000), Some(Arc::new(FailingTransport)));

    record_value(&reporter, "a.ts", 1, &HostValue::Number(1.0));
    let flushed = reporter.flush_now();
    assert_eq!(flushed, 1);
    assert_eq!(reporter.buffered_keys(), 0, "loss is tolerated, no requeue");
}

#[test]
fn buffer_cap_drops_and_counts() {
    let mut small = config(60_000);
    small.max_buffer_keys = 2;
    let reporter = Reporter::with_transport(small, Some(Arc::new(CapturingTransport::default())));

    record_value(&reporter, "a.ts", 1, &HostValue::Number(1.0));
    record_value(&reporter, "a.ts", 2, &HostValue::Number(1.0));
    record_value(&reporter, "a.ts", 3, &HostValue::Number(1.0));

    assert_eq!(reporter.buffered_keys(), 2);
    assert_eq!(reporter.dropped(), 1);
}

#[test]
fn reset_clears_everything() {
    let reporter = Reporter::with_transport(config(60_000), None);
    record_value(&reporter, "a.ts", 1, &HostValue::Number(1.0));
    reporter.reset();
    assert_eq!(reporter.buffered_keys(), 0);
    assert_eq!(reporter.dropped(), 0);
}

#[test]
fn global_facade_roundtrip() {
    let transport = Arc::new(CapturingTransport::default());
    typetrace_runtime::configure_with(config(60_000), Some(transport.clone()));
    typetrace_runtime::reset();

    let todo = HostValue::object(vec![
        ("id".into(), HostValue::str("a")),
        ("done".into(), HostValue::Bool(false)),
    ]);
    typetrace_runtime::track(&todo, "src/todo.ts", 40);
    typetrace_runtime::twiz(
        "addTodo_param_todo",
        &todo,
        120,
        "src/todo.ts",
        &ObservationMetadata {
            function_name: Some("addTodo".into()),
            parameter_name: Some("todo".into()),
            ..Default::default()
        },
    );

    let flushed = typetrace_runtime::flush();
    assert_eq!(flushed, 1);

    let records: Vec<BatchRecord> =
        serde_json::from_value(transport.batches()[0].clone()).unwrap();
    let (filename, offset, values, metadata) = records[0].clone().into_parts();
    assert_eq!((filename.as_str(), offset), ("src/todo.ts", 120));
    assert_eq!(metadata.function_name.as_deref(), Some("addTodo"));
    // Tracked provenance rides along with the composite value.
    let provenance = values[0].1.as_ref().expect("provenance attached");
    assert_eq!(provenance.0, "src/todo.ts");
    assert_eq!(provenance.1, 40);
}
