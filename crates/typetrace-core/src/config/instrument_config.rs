//! Instrumenter / bundler-adapter configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the build-time instrumenter and its bundler adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Include globs. When non-empty, a file must match at least one.
    pub include: Vec<String>,
    /// Exclude globs. A file matching any of these is left untouched.
    pub exclude: Vec<String>,
    /// Collector ingest URL baked into the injected prelude.
    pub collector_url: String,
    /// Flush period (ms) baked into the injected prelude.
    pub prelude_flush_interval_ms: u64,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: vec!["**/node_modules/**".to_string()],
            collector_url: "http://127.0.0.1:4302/ingest".to_string(),
            prelude_flush_interval_ms: 2000,
        }
    }
}
