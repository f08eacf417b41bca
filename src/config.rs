use crate::env::*;
use crate::init::LoggerConfig;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Error type returned when configuration is missing or malformed.
///
/// Any of these aborts startup: the service does not run with a logging
/// pipeline it could not build as configured.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("remote sink is enabled but no collector URL is configured")]
    MissingCollectorUrl,

    #[error("invalid collector URL `{url}`: {reason}")]
    InvalidCollectorUrl { url: String, reason: String },
}

/// Process configuration: listener address plus the logging pipeline.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub bind_address: SocketAddr,
    pub logging: LoggerConfig,
}

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 5000)),
            logging: LoggerConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Read configuration from the process environment, see [`crate::env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(lookup)
    }

    /// Read configuration through `lookup`; unset keys keep their defaults.
    /// The result is validated before it is returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = LoggerConfig::default();

        let logging = LoggerConfig {
            minimum_level: parse_or(&lookup, LOG_MINIMUM_LEVEL_ENV, defaults.minimum_level)?,
            enable_console: flag_or(&lookup, LOG_ENABLE_CONSOLE_ENV, defaults.enable_console)?,
            console_format: parse_or(&lookup, LOG_CONSOLE_FORMAT_ENV, defaults.console_format)?,
            enable_remote: flag_or(&lookup, LOG_ENABLE_REMOTE_ENV, defaults.enable_remote)?,
            collector_url: lookup(LOG_COLLECTOR_URL_ENV).or(defaults.collector_url),
            collector_api_key: lookup(LOG_COLLECTOR_API_KEY_ENV),
            collector_timeout: millis_or(&lookup, LOG_COLLECTOR_TIMEOUT_MS_ENV, defaults.collector_timeout)?,
            enrich_from_context: flag_or(&lookup, LOG_ENRICH_FROM_CONTEXT_ENV, defaults.enrich_from_context)?,
            service_name: lookup(LOG_SERVICE_NAME_ENV),
            channel_buffer: parse_or(&lookup, LOG_CHANNEL_BUFFER_ENV, defaults.channel_buffer)?,
            batch_size: parse_or(&lookup, LOG_BATCH_SIZE_ENV, defaults.batch_size)?,
            flush_interval: millis_or(&lookup, LOG_FLUSH_INTERVAL_MS_ENV, defaults.flush_interval)?,
        };
        logging.validate()?;

        Ok(ServiceConfig {
            bind_address: parse_or(&lookup, SERVICE_BIND_ADDRESS_ENV, ServiceConfig::default().bind_address)?,
            logging,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn flag_or<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
            reason: "expected a boolean".to_string(),
        }),
    }
}

fn millis_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, key, default.as_millis() as u64).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ConsoleFormat;
    use crate::level::Level;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.bind_address.to_string(), DEFAULT_BIND_ADDRESS);
        assert_eq!(config.logging.minimum_level, Level::Debug);
        assert!(config.logging.enable_console);
        assert!(config.logging.enable_remote);
        assert_eq!(config.logging.collector_url.as_deref(), Some("http://localhost:5341"));
    }

    #[test]
    fn recognised_variables_override_defaults() {
        let config = from_pairs(&[
            (LOG_MINIMUM_LEVEL_ENV, "warning"),
            (LOG_ENABLE_REMOTE_ENV, "false"),
            (LOG_CONSOLE_FORMAT_ENV, "json"),
            (LOG_FLUSH_INTERVAL_MS_ENV, "250"),
            (LOG_SERVICE_NAME_ENV, "weather"),
            (SERVICE_BIND_ADDRESS_ENV, "127.0.0.1:8080"),
        ])
        .unwrap();

        assert_eq!(config.logging.minimum_level, Level::Warning);
        assert!(!config.logging.enable_remote);
        assert_eq!(config.logging.console_format, ConsoleFormat::Json);
        assert_eq!(config.logging.flush_interval, Duration::from_millis(250));
        assert_eq!(config.logging.service_name.as_deref(), Some("weather"));
        assert_eq!(config.bind_address.port(), 8080);
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(matches!(
            from_pairs(&[(LOG_MINIMUM_LEVEL_ENV, "chatty")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            from_pairs(&[(LOG_ENABLE_CONSOLE_ENV, "maybe")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            from_pairs(&[(LOG_BATCH_SIZE_ENV, "-3")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            from_pairs(&[(LOG_COLLECTOR_URL_ENV, "seq-host")]),
            Err(ConfigError::InvalidCollectorUrl { .. })
        ));
    }

    #[test]
    fn out_of_range_batching_values_are_errors() {
        for key in [LOG_CHANNEL_BUFFER_ENV, LOG_BATCH_SIZE_ENV, LOG_FLUSH_INTERVAL_MS_ENV] {
            match from_pairs(&[(key, "18446744073709551615")]) {
                Err(ConfigError::InvalidValue { key: rejected, .. }) => assert_eq!(rejected, key),
                other => panic!("{} should be rejected, got {:?}", key, other),
            }
        }
        let config = from_pairs(&[(LOG_CHANNEL_BUFFER_ENV, "4096"), (LOG_BATCH_SIZE_ENV, "512")]).unwrap();
        assert_eq!(config.logging.batching().buffer, 4096);
        assert_eq!(config.logging.batching().batch_size, 512);
    }
}
