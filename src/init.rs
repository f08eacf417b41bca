use crate::backend::{make_sink, BuildError, SinkDescriptor};
use crate::config::ConfigError;
use crate::console::ConsoleFormat;
use crate::enrich::{FromLogContext, WithProperty};
use crate::level::Level;
use crate::logger::Logger;
use crate::env::{LOG_BATCH_SIZE_ENV, LOG_CHANNEL_BUFFER_ENV, LOG_FLUSH_INTERVAL_MS_ENV};
use crate::worker::{Batching, MAX_BATCH_SIZE, MAX_BUFFER, MAX_FLUSH_INTERVAL};
use tokio::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;
use url::Url;

/// Logging pipeline configuration.
///
/// **Fields**
/// - `minimum_level`: events below this severity never reach a sink.
/// - `enable_console` / `console_format`: stdout sink and its line format.
/// - `enable_remote` / `collector_url` / `collector_api_key` /
///   `collector_timeout`: remote collector sink.
/// - `enrich_from_context`: attach ambient span context to every event.
/// - `service_name`: when set, every event carries `Application`.
/// - `channel_buffer`, `batch_size`, `flush_interval`: per-sink queue
///   and batching, see [`Batching`].
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    pub minimum_level: Level,
    pub enable_console: bool,
    pub console_format: ConsoleFormat,
    pub enable_remote: bool,
    pub collector_url: Option<String>,
    pub collector_api_key: Option<String>,
    pub collector_timeout: Duration,
    pub enrich_from_context: bool,
    pub service_name: Option<String>,
    pub channel_buffer: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
}

pub const DEFAULT_COLLECTOR_URL: &str = "http://localhost:5341";

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            minimum_level: Level::Debug,
            enable_console: true,
            console_format: ConsoleFormat::Text,
            enable_remote: true,
            collector_url: Some(DEFAULT_COLLECTOR_URL.to_string()),
            collector_api_key: None,
            collector_timeout: Duration::from_secs(5),
            enrich_from_context: true,
            service_name: None,
            channel_buffer: 1024,
            batch_size: 128,
            flush_interval: Duration::from_secs(1),
        }
    }
}

impl LoggerConfig {
    /// Enabled sinks in registration order: console first, then collector.
    ///
    /// **Errors**
    /// - [`ConfigError::MissingCollectorUrl`] when the remote sink is on
    ///   without a URL.
    /// - [`ConfigError::InvalidCollectorUrl`] when the URL does not parse or
    ///   is not `http(s)`.
    pub fn sink_descriptors(&self) -> Result<Vec<SinkDescriptor>, ConfigError> {
        let mut sinks = Vec::new();
        if self.enable_console {
            sinks.push(SinkDescriptor::Console {
                format: self.console_format,
            });
        }
        if self.enable_remote {
            let raw = self.collector_url.as_deref().ok_or(ConfigError::MissingCollectorUrl)?;
            let url = parse_collector_url(raw)?;
            sinks.push(SinkDescriptor::Collector {
                url: url.as_str().trim_end_matches('/').to_string(),
                api_key: self.collector_api_key.clone(),
                timeout: self.collector_timeout,
            });
        }
        Ok(sinks)
    }

    /// Sink descriptors must build and batching values must lie within the
    /// limits of [`Batching`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_at_most(LOG_CHANNEL_BUFFER_ENV, self.channel_buffer, MAX_BUFFER)?;
        check_at_most(LOG_BATCH_SIZE_ENV, self.batch_size, MAX_BATCH_SIZE)?;
        check_at_most(
            LOG_FLUSH_INTERVAL_MS_ENV,
            self.flush_interval.as_millis(),
            MAX_FLUSH_INTERVAL.as_millis(),
        )?;
        self.sink_descriptors().map(|_| ())
    }

    pub fn batching(&self) -> Batching {
        Batching::new(self.channel_buffer, self.batch_size, self.flush_interval)
    }
}

fn check_at_most<T>(key: &str, value: T, max: T) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value > max {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: format!("must be at most {}", max),
        });
    }
    Ok(())
}

pub fn parse_collector_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidCollectorUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme `{}`", other))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Build the logger described by `config` without installing it.
///
/// Must run inside a Tokio runtime. The collector is not contacted.
pub fn build_logger(config: &LoggerConfig) -> Result<Logger, BuildError> {
    let mut builder = Logger::builder()
        .minimum_level(config.minimum_level)
        .batching(config.batching());

    if config.enrich_from_context {
        builder = builder.enrich(FromLogContext);
    }
    if let Some(name) = &config.service_name {
        builder = builder.enrich(WithProperty::new("Application", name.as_str()));
    }
    for descriptor in config.sink_descriptors()? {
        builder = builder.write_to_shared(make_sink(&descriptor)?);
    }

    builder.build()
}

/// Install a [`Registry`] combined with the logger's layer as the global
/// default subscriber, so every `tracing` event in the process goes
/// through the pipeline.
pub fn install(logger: &Logger) -> Result<(), BuildError> {
    let subscriber = Registry::default().with(logger.layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Build the logger from `config` and install it globally.
pub fn init_logging_with_config(config: &LoggerConfig) -> Result<Logger, BuildError> {
    let logger = build_logger(config)?;
    install(&logger)?;
    Ok(logger)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_console_then_collector() {
        let sinks = LoggerConfig::default().sink_descriptors().unwrap();
        assert_eq!(sinks.len(), 2);
        assert_eq!(sinks[0], SinkDescriptor::Console { format: ConsoleFormat::Text });
        match &sinks[1] {
            SinkDescriptor::Collector { url, .. } => assert_eq!(url, "http://localhost:5341"),
            other => panic!("unexpected sink {:?}", other),
        }
    }

    #[test]
    fn remote_without_url_is_rejected() {
        let config = LoggerConfig {
            collector_url: None,
            ..LoggerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingCollectorUrl)));
    }

    #[test]
    fn malformed_collector_urls_are_rejected() {
        for raw in ["not a url", "ftp://logs.example.com", "localhost:5341"] {
            assert!(
                matches!(parse_collector_url(raw), Err(ConfigError::InvalidCollectorUrl { .. })),
                "{} should be rejected",
                raw
            );
        }
        assert!(parse_collector_url("https://seq.internal:5341/").is_ok());
    }

    #[test]
    fn disabled_remote_ignores_the_url() {
        let config = LoggerConfig {
            enable_remote: false,
            collector_url: Some("::bogus::".to_string()),
            ..LoggerConfig::default()
        };
        assert_eq!(config.sink_descriptors().unwrap().len(), 1);
    }

    #[test]
    fn oversized_batching_values_are_rejected() {
        let config = LoggerConfig {
            batch_size: MAX_BATCH_SIZE + 1,
            ..LoggerConfig::default()
        };
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, LOG_BATCH_SIZE_ENV),
            other => panic!("unexpected result {:?}", other),
        }

        let at_limit = LoggerConfig {
            channel_buffer: MAX_BUFFER,
            batch_size: MAX_BATCH_SIZE,
            flush_interval: MAX_FLUSH_INTERVAL,
            ..LoggerConfig::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[tokio::test]
    async fn build_logger_registers_enabled_sinks() {
        let config = LoggerConfig {
            enable_remote: false,
            ..LoggerConfig::default()
        };
        let logger = build_logger(&config).unwrap();
        assert_eq!(logger.sink_names(), vec!["console"]);
        assert_eq!(logger.minimum_level(), Level::Debug);
    }
}
