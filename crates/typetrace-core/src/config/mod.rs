//! Configuration system for typetrace.
//! TOML-based, 3-layer resolution: env > config file > defaults.

pub mod collector_config;
pub mod instrument_config;
pub mod runtime_config;
pub mod typetrace_config;

pub use collector_config::CollectorConfig;
pub use instrument_config::InstrumentConfig;
pub use runtime_config::RuntimeConfig;
pub use typetrace_config::TypetraceConfig;
