//! Collector server configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the collector process: store location, bind address,
/// and pagination bounds for the query surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Path of the SQLite database file.
    pub database_path: String,
    /// Listen address for the HTTP surface.
    pub bind: String,
    /// Default page size for paginated endpoints that do not override it.
    pub default_page_size: u32,
    /// Upper bound applied to any client-supplied limit.
    pub max_page_size: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            database_path: "typetrace.db".to_string(),
            bind: "127.0.0.1:4302".to_string(),
            default_page_size: 50,
            max_page_size: 500,
        }
    }
}
