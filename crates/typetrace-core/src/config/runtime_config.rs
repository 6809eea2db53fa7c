//! In-process runtime library configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the batching reporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Collector ingest URL. Empty string means "no transport": observations
    /// are buffered but never posted.
    pub collector_url: String,
    /// Single-shot flush timer period in milliseconds.
    pub flush_interval_ms: u64,
    /// Hard cap on distinct `(filename, offset)` keys buffered between
    /// flushes. Observations past the cap are dropped.
    pub max_buffer_keys: usize,
    /// Outbound request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            collector_url: "http://127.0.0.1:4302/ingest".to_string(),
            flush_interval_ms: 2000,
            max_buffer_keys: 10_000,
            request_timeout_ms: 10_000,
        }
    }
}
