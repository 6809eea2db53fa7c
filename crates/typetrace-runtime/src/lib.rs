//! typetrace-runtime: the in-process observation runtime.
//!
//! Receives `(label, value, offset, filename, metadata)` at arbitrary call
//! sites, serialises the value into a JSON-safe surrogate, deduplicates
//! per `(filename, offset)`, and flushes batches to the collector on a
//! single-shot timer. Process-wide: lazily initialised on the first
//! observation, no explicit teardown. `reset` exists as a test hook.

pub mod buffer;
pub mod provenance;
pub mod reporter;
pub mod serialize;
pub mod value;

use std::cell::RefCell;
use std::sync::{Arc, Mutex, OnceLock};

use typetrace_core::config::RuntimeConfig;
use typetrace_core::model::ObservationMetadata;

pub use reporter::{BatchTransport, HttpTransport, Reporter};
pub use value::HostValue;

use provenance::ProvenanceRegistry;

static GLOBAL: OnceLock<Mutex<Arc<Reporter>>> = OnceLock::new();

thread_local! {
    // Host values are bound to their event-processing thread, so their
    // provenance registry is too.
    static PROVENANCE: RefCell<ProvenanceRegistry> = RefCell::new(ProvenanceRegistry::new());
}

fn global_cell() -> &'static Mutex<Arc<Reporter>> {
    GLOBAL.get_or_init(|| Mutex::new(Reporter::new(RuntimeConfig::default())))
}

fn global() -> Arc<Reporter> {
    global_cell()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Replace the process-wide reporter. Buffered observations in the old
/// reporter are abandoned.
pub fn configure(config: RuntimeConfig) {
    replace(Reporter::new(config));
}

/// Replace the process-wide reporter with an explicit transport (used by
/// tests and embedders with their own dispatch).
pub fn configure_with(config: RuntimeConfig, transport: Option<Arc<dyn BatchTransport>>) {
    replace(Reporter::with_transport(config, transport));
}

fn replace(reporter: Arc<Reporter>) {
    let mut guard = global_cell()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = reporter;
}

/// The instrumentation entry point: record one parameter observation.
pub fn twiz(
    label: &str,
    value: &HostValue,
    offset: u64,
    filename: &str,
    metadata: &ObservationMetadata,
) {
    let surrogate = serialize::surrogate(value);
    let serialised = serde_json::to_string(&surrogate).unwrap_or_default();
    let provenance = PROVENANCE.with(|registry| registry.borrow().lookup(value));
    global().record(filename, offset, surrogate, serialised, provenance, metadata);
    tracing::trace!(label, filename, offset, "observation recorded");
}

/// Record the instrumenter-injected origin of a composite value. Weak:
/// never prevents reclamation of the tracked object.
pub fn track(value: &HostValue, filename: &str, offset: u64) {
    PROVENANCE.with(|registry| registry.borrow_mut().track(value, filename, offset));
}

/// Drain the buffer into one immediate post. Returns the record count.
pub fn flush() -> usize {
    global().flush_now()
}

/// Test hook: clear the buffer, timer state, and provenance registry.
pub fn reset() {
    global().reset();
    PROVENANCE.with(|registry| registry.borrow_mut().clear());
}
