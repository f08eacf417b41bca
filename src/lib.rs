//! Weather forecast service with a structured logging pipeline.
//!
//! The pipeline ([`logger::Logger`]) filters by minimum level, enriches
//! events with ambient span context and fans them out to console and
//! remote-collector sinks without ever blocking the caller. The HTTP side
//! ([`server`]) serves one route and logs one event per request through it.

pub mod level;
pub mod record;
pub mod template;
pub mod sink;
pub mod layer;
pub mod scope;
pub mod enrich;
pub mod worker;
pub mod logger;

pub mod console;
#[cfg(feature = "collector")]
pub mod collector;
pub mod memory_sink;
pub mod backend;

pub mod env;
pub mod config;
pub mod init;

pub mod forecast;
pub mod server;

pub use level::Level;
pub use logger::{Logger, LoggerBuilder, LoggerStats};
pub use record::{LogEvent, Properties, ScalarValue};
pub use sink::LogSink;
