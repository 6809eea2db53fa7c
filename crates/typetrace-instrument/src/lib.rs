//! typetrace-instrument: source-to-source instrumentation of JS/TS.
//!
//! Parses each file with tree-sitter and implants one `twiz` record per
//! formal parameter plus one entry record per function, preserving the
//! physical line of every pre-existing statement. Parser failure returns
//! `SourceUnparseable` so the caller can fall back to the original source;
//! individual uninstrumentable nodes are skipped in place.

pub mod adapter;
pub mod callee;
pub mod dialect;
pub mod params;
pub mod prelude;
pub mod rewrite;
mod visit;

use tree_sitter::Parser;
use typetrace_core::config::InstrumentConfig;
use typetrace_core::errors::InstrumentError;

pub use adapter::Adapter;
pub use dialect::Dialect;

/// Instrumenter behaviour knobs.
#[derive(Debug, Clone)]
pub struct InstrumentOptions {
    /// Prepend the host-guarded `twiz` prelude to each output file.
    pub emit_prelude: bool,
    /// Collector ingest URL baked into the prelude.
    pub collector_url: String,
    /// Flush period baked into the prelude.
    pub flush_interval_ms: u64,
}

impl Default for InstrumentOptions {
    fn default() -> Self {
        Self::from(&InstrumentConfig::default())
    }
}

impl From<&InstrumentConfig> for InstrumentOptions {
    fn from(config: &InstrumentConfig) -> Self {
        Self {
            emit_prelude: true,
            collector_url: config.collector_url.clone(),
            flush_interval_ms: config.prelude_flush_interval_ms,
        }
    }
}

/// The AST instrumenter. Stateless between files; identical inputs
/// produce identical outputs.
#[derive(Debug, Default)]
pub struct Instrumenter {
    options: InstrumentOptions,
}

impl Instrumenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: InstrumentOptions) -> Self {
        Self { options }
    }

    /// Instrument a source file, detecting the dialect from the filename.
    pub fn instrument(&self, source: &str, filename: &str) -> Result<String, InstrumentError> {
        let dialect = Dialect::from_filename(filename).ok_or_else(|| {
            InstrumentError::UnsupportedDialect { filename: filename.to_string() }
        })?;
        self.instrument_dialect(source, filename, dialect)
    }

    /// Instrument a source file under an explicit dialect.
    pub fn instrument_dialect(
        &self,
        source: &str,
        filename: &str,
        dialect: Dialect,
    ) -> Result<String, InstrumentError> {
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|e| InstrumentError::SourceUnparseable {
                filename: filename.to_string(),
                reason: e.to_string(),
            })?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| InstrumentError::SourceUnparseable {
                filename: filename.to_string(),
                reason: "parser produced no tree".to_string(),
            })?;
        if tree.root_node().has_error() {
            return Err(InstrumentError::SourceUnparseable {
                filename: filename.to_string(),
                reason: "syntax error".to_string(),
            });
        }

        let injections = visit::Visitor::new(source, filename).collect(tree.root_node());
        let instrumented = rewrite::apply_injections(source, injections);

        if self.options.emit_prelude {
            let mut out =
                prelude::prelude(&self.options.collector_url, self.options.flush_interval_ms);
            out.push_str(&instrumented);
            Ok(out)
        } else {
            Ok(instrumented)
        }
    }
}
