use crate::record::LogEvent;
use crate::sink::LogSink;
use async_trait::async_trait;
use reqwest::Client;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for [`CollectorSink`].
///
/// The sink talks to a log collector over HTTP, posting batches of
/// newline-delimited compact log events (CLEF) to its raw ingestion
/// endpoint.
#[derive(Clone, Debug)]
pub struct CollectorConfig {
    /// Base URL without path, e.g. "http://localhost:5341"
    pub url: String,
    /// Sent as `X-Seq-ApiKey` when present.
    pub api_key: Option<String>,
    /// Upper bound on a single delivery request.
    pub timeout: Duration,
}

impl CollectorConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Remote collector implementation of [`LogSink`].
///
/// Construction never touches the network; the collector being down only
/// shows up as delivery failures later.
#[derive(Clone)]
pub struct CollectorSink {
    client: Client,
    config: CollectorConfig,
}

impl CollectorSink {
    /// Construct a new sink instance using the provided configuration.
    ///
    /// **Returns**
    /// - `Err(..)` only if the HTTP client itself cannot be built (TLS
    ///   backend initialisation).
    pub fn new(config: CollectorConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/events/raw?clef", self.config.url.trim_end_matches('/'))
    }

    async fn post(&self, body: String) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut req = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/vnd.serilog.clef")
            .body(body);
        if let Some(key) = &self.config.api_key {
            req = req.header("X-Seq-ApiKey", key);
        }

        let resp = req.send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            Err(format!("collector ingestion failed with status {}: {}", status, text).into())
        }
    }
}

fn clef_body<'a>(events: impl IntoIterator<Item = &'a LogEvent>) -> String {
    let mut body = String::new();
    for event in events {
        body.push_str(&event.to_clef().to_string());
        body.push('\n');
    }
    body
}

#[async_trait]
impl LogSink for CollectorSink {
    fn name(&self) -> &str {
        "collector"
    }

    async fn send(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.post(clef_body([event])).await
    }

    async fn send_batch(&self, events: &[Arc<LogEvent>]) -> Result<(), Box<dyn Error + Send + Sync>> {
        if events.is_empty() {
            return Ok(());
        }
        self.post(clef_body(events.iter().map(|e| &**e))).await
    }
}
