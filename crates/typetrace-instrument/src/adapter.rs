//! Bundler adapter: per-file glue between a build pipeline and the
//! instrumenter.

use globset::{Glob, GlobSet, GlobSetBuilder};
use typetrace_core::config::InstrumentConfig;
use typetrace_core::TraceErrorCode;

use crate::dialect::Dialect;
use crate::{InstrumentOptions, Instrumenter};

/// File-filtering wrapper around the instrumenter. A file is processed
/// when it has a recognised dialect extension, matches at least one
/// include glob (if any are configured), and matches no exclude glob.
/// Instrumenter failure falls back to the original source.
pub struct Adapter {
    instrumenter: Instrumenter,
    includes: GlobSet,
    has_includes: bool,
    excludes: GlobSet,
}

impl Adapter {
    pub fn new(config: &InstrumentConfig) -> Self {
        Self {
            instrumenter: Instrumenter::with_options(InstrumentOptions::from(config)),
            includes: build_glob_set(&config.include),
            has_includes: !config.include.is_empty(),
            excludes: build_glob_set(&config.exclude),
        }
    }

    /// Whether this file passes the extension and glob filters.
    pub fn should_instrument(&self, filename: &str) -> bool {
        if Dialect::from_filename(filename).is_none() {
            return false;
        }
        if self.has_includes && !self.includes.is_match(filename) {
            return false;
        }
        !self.excludes.is_match(filename)
    }

    /// Instrument one file, returning the original source untouched when
    /// the file is filtered out or the instrumenter fails.
    pub fn process(&self, source: &str, filename: &str) -> String {
        if !self.should_instrument(filename) {
            return source.to_string();
        }
        match self.instrumenter.instrument(source, filename) {
            Ok(instrumented) => instrumented,
            Err(e) => {
                tracing::warn!(
                    filename,
                    error = %e,
                    code = e.error_code(),
                    "instrumentation failed, emitting original source"
                );
                source.to_string()
            }
        }
    }
}

fn build_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => {
                tracing::warn!(pattern, error = %e, "ignoring invalid glob");
            }
        }
    }
    builder.build().unwrap_or_else(|_| GlobSetBuilder::new().build().unwrap())
}
