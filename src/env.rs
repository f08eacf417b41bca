//! Environment variable names read by [`ServiceConfig::from_env`].
//!
//! [`ServiceConfig::from_env`]: crate::config::ServiceConfig::from_env

/// Socket address the HTTP listener binds, e.g. `0.0.0.0:5000`.
pub const SERVICE_BIND_ADDRESS_ENV: &str = "SERVICE_BIND_ADDRESS";

/// Minimum severity that reaches any sink (`Debug` .. `Fatal`).
pub const LOG_MINIMUM_LEVEL_ENV: &str = "LOG_MINIMUM_LEVEL";

/// `true`/`false`: write events to stdout.
pub const LOG_ENABLE_CONSOLE_ENV: &str = "LOG_ENABLE_CONSOLE";

/// `text` or `json`.
pub const LOG_CONSOLE_FORMAT_ENV: &str = "LOG_CONSOLE_FORMAT";

/// `true`/`false`: ship events to the remote collector.
pub const LOG_ENABLE_REMOTE_ENV: &str = "LOG_ENABLE_REMOTE";

/// Collector base URL, e.g. `http://localhost:5341`.
pub const LOG_COLLECTOR_URL_ENV: &str = "LOG_COLLECTOR_URL";

/// Optional collector API key.
pub const LOG_COLLECTOR_API_KEY_ENV: &str = "LOG_COLLECTOR_API_KEY";

/// Per-request timeout towards the collector, in milliseconds.
pub const LOG_COLLECTOR_TIMEOUT_MS_ENV: &str = "LOG_COLLECTOR_TIMEOUT_MS";

/// `true`/`false`: attach ambient span context to events.
pub const LOG_ENRICH_FROM_CONTEXT_ENV: &str = "LOG_ENRICH_FROM_CONTEXT";

/// Optional service name attached to every event as `Application`.
pub const LOG_SERVICE_NAME_ENV: &str = "LOG_SERVICE_NAME";

/// Per-sink queue capacity.
pub const LOG_CHANNEL_BUFFER_ENV: &str = "LOG_CHANNEL_BUFFER";

/// Events per delivery batch.
pub const LOG_BATCH_SIZE_ENV: &str = "LOG_BATCH_SIZE";

/// Longest wait before a partial batch is delivered, in milliseconds.
pub const LOG_FLUSH_INTERVAL_MS_ENV: &str = "LOG_FLUSH_INTERVAL_MS";

/// Lookup used by [`ServiceConfig::from_env`]: unset and empty are the same.
///
/// [`ServiceConfig::from_env`]: crate::config::ServiceConfig::from_env
pub fn lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
