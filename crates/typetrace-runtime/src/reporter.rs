//! The batching reporter.
//!
//! Observations accumulate in the buffer; a single-shot timer starts on
//! the first observation after the previous flush. On expiry the buffer is
//! swapped for a fresh one under the lock and the drained batch is POSTed
//! outside it, so observations arriving during dispatch land in the next
//! batch. No retry: a failed post is logged and its batch is lost.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde_json::Value;
use typetrace_core::config::RuntimeConfig;
use typetrace_core::errors::RuntimeError;
use typetrace_core::model::{ObservationMetadata, Provenance};

use crate::buffer::ObservationBuffer;

/// Outbound transport for drained batches.
pub trait BatchTransport: Send + Sync {
    fn post(&self, batch: &Value) -> Result<(), RuntimeError>;
}

/// Blocking HTTP transport posting JSON to the collector ingest endpoint.
pub struct HttpTransport {
    url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(url: String, timeout: Duration) -> Self {
        Self { url, timeout }
    }
}

impl BatchTransport for HttpTransport {
    fn post(&self, batch: &Value) -> Result<(), RuntimeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| RuntimeError::Transport { reason: e.to_string() })?;
        let response = client
            .post(&self.url)
            .json(batch)
            .send()
            .map_err(|e| RuntimeError::Transport { reason: e.to_string() })?;
        if !response.status().is_success() {
            return Err(RuntimeError::Transport {
                reason: format!("collector returned {}", response.status()),
            });
        }
        Ok(())
    }
}

struct ReporterState {
    buffer: ObservationBuffer,
    flush_scheduled: bool,
}

/// Mutex-wrapped buffer plus the single-flusher timer discipline.
pub struct Reporter {
    config: RuntimeConfig,
    transport: Option<Arc<dyn BatchTransport>>,
    state: Mutex<ReporterState>,
    // Handle to self for the timer thread; set once at construction.
    weak_self: Weak<Reporter>,
}

impl Reporter {
    /// Build a reporter with the HTTP transport implied by the config.
    /// An empty collector URL means no transport: the buffer is retained
    /// until something drains it explicitly.
    pub fn new(config: RuntimeConfig) -> Arc<Self> {
        let transport: Option<Arc<dyn BatchTransport>> = if config.collector_url.is_empty() {
            None
        } else {
            Some(Arc::new(HttpTransport::new(
                config.collector_url.clone(),
                Duration::from_millis(config.request_timeout_ms),
            )))
        };
        Self::with_transport(config, transport)
    }

    pub fn with_transport(
        config: RuntimeConfig,
        transport: Option<Arc<dyn BatchTransport>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            state: Mutex::new(ReporterState {
                buffer: ObservationBuffer::new(config.max_buffer_keys),
                flush_scheduled: false,
            }),
            config,
            transport,
            weak_self: weak.clone(),
        })
    }

    /// Record one already-serialised observation and start the flush timer
    /// if this is the first observation since the last flush.
    pub fn record(
        &self,
        filename: &str,
        offset: u64,
        surrogate: Value,
        serialised: String,
        provenance: Option<Provenance>,
        metadata: &ObservationMetadata,
    ) {
        let schedule = {
            let mut state = self.lock_state();
            state.buffer.record(filename, offset, surrogate, serialised, provenance, metadata);
            if !state.buffer.is_empty() && !state.flush_scheduled && self.transport.is_some() {
                state.flush_scheduled = true;
                true
            } else {
                false
            }
        };
        if schedule {
            self.schedule_flush();
        }
    }

    fn schedule_flush(&self) {
        let Some(reporter) = self.weak_self.upgrade() else { return };
        let delay = Duration::from_millis(self.config.flush_interval_ms);
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            reporter.flush_now();
        });
    }

    /// Drain and post the buffer. Returns the number of records drained;
    /// with no transport configured the buffer is retained and 0 is
    /// returned.
    pub fn flush_now(&self) -> usize {
        let Some(transport) = &self.transport else {
            let mut state = self.lock_state();
            state.flush_scheduled = false;
            return 0;
        };

        let batch = {
            let mut state = self.lock_state();
            state.flush_scheduled = false;
            state.buffer.take_batch()
        };
        if batch.is_empty() {
            return 0;
        }
        let count = batch.len();

        match serde_json::to_value(&batch) {
            Ok(json) => {
                if let Err(e) = transport.post(&json) {
                    tracing::warn!(error = %e, records = count, "batch post failed, records lost");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "batch serialisation failed, records lost");
            }
        }
        count
    }

    /// Test hook: discard all buffered state.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        state.buffer.clear();
        state.flush_scheduled = false;
    }

    /// Number of distinct `(filename, offset)` keys currently buffered.
    pub fn buffered_keys(&self) -> usize {
        self.lock_state().buffer.len()
    }

    /// Observations dropped by the buffer cap since the last reset.
    pub fn dropped(&self) -> u64 {
        self.lock_state().buffer.dropped()
    }

    fn lock_state(&self) -> MutexGuard<'_, ReporterState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
