use std::sync::Arc;
use std::time::Duration;

use crate::console::{ConsoleFormat, ConsoleSink};
use crate::sink::LogSink;

/// Sink selected by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkDescriptor {
    /// Line-per-event output on stdout.
    Console { format: ConsoleFormat },
    /// Remote collector reached over HTTP.
    Collector {
        url: String,
        api_key: Option<String>,
        timeout: Duration,
    },
}

impl SinkDescriptor {
    pub fn name(&self) -> &'static str {
        match self {
            SinkDescriptor::Console { .. } => "console",
            SinkDescriptor::Collector { .. } => "collector",
        }
    }
}

/// Error type returned when building sinks or the logger itself.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("collector feature is not enabled")]
    CollectorFeatureDisabled,

    #[cfg(feature = "collector")]
    #[error("failed to build collector HTTP client: {0}")]
    CollectorClient(#[from] reqwest::Error),

    #[error("logger must be built inside a Tokio runtime")]
    NoRuntime,

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("failed to install global subscriber: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Create a concrete `LogSink` implementation from a descriptor.
///
/// Nothing here connects anywhere: an unreachable collector is not a
/// build error.
pub fn make_sink(descriptor: &SinkDescriptor) -> Result<Arc<dyn LogSink>, BuildError> {
    match descriptor {
        SinkDescriptor::Console { format } => Ok(Arc::new(ConsoleSink::new(*format)) as Arc<dyn LogSink>),
        SinkDescriptor::Collector { url, api_key, timeout } => {
            #[cfg(feature = "collector")]
            {
                use crate::collector::{CollectorConfig, CollectorSink};

                let config = CollectorConfig {
                    url: url.clone(),
                    api_key: api_key.clone(),
                    timeout: *timeout,
                };
                let sink = CollectorSink::new(config)?;
                Ok(Arc::new(sink) as Arc<dyn LogSink>)
            }

            #[cfg(not(feature = "collector"))]
            {
                let _ = (url, api_key, timeout);
                Err(BuildError::CollectorFeatureDisabled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_descriptor_builds_console_sink() {
        let sink = make_sink(&SinkDescriptor::Console { format: ConsoleFormat::Json }).unwrap();
        assert_eq!(sink.name(), "console");
    }

    #[cfg(feature = "collector")]
    #[test]
    fn collector_descriptor_builds_without_reaching_the_network() {
        let descriptor = SinkDescriptor::Collector {
            url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            timeout: Duration::from_millis(200),
        };
        let sink = make_sink(&descriptor).unwrap();
        assert_eq!(sink.name(), "collector");
        assert_eq!(descriptor.name(), "collector");
    }
}
