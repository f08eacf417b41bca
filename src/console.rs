use crate::record::LogEvent;
use crate::sink::LogSink;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// Line format written by [`ConsoleSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    /// `[12:00:01 INF] message key=value ...`, where the pairs are the
    /// event's context; call-site properties already appear in the message.
    #[default]
    Text,
    /// One compact JSON object per line, same shape as the collector payload.
    Json,
}

impl FromStr for ConsoleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(ConsoleFormat::Text),
            "json" | "clef" => Ok(ConsoleFormat::Json),
            other => Err(format!("unknown console format `{}`", other)),
        }
    }
}

/// Writes one line per event to standard output.
pub struct ConsoleSink {
    format: ConsoleFormat,
    out: Mutex<Stdout>,
}

impl ConsoleSink {
    pub fn new(format: ConsoleFormat) -> Self {
        Self {
            format,
            out: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(ConsoleFormat::Text)
    }
}

/// Render one event as a console line, without the trailing newline.
pub fn format_line(event: &LogEvent, format: ConsoleFormat) -> String {
    match format {
        ConsoleFormat::Json => event.to_clef().to_string(),
        ConsoleFormat::Text => {
            let mut line = format!(
                "[{} {}] {}",
                event.timestamp.format("%H:%M:%S"),
                event.level.short(),
                event.message
            );
            for (name, value) in &event.context {
                let _ = write!(line, " {}={}", name, value);
            }
            line
        }
    }
}

#[async_trait]
impl LogSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        let line = format_line(event, self.format) + "\n";
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn send_batch(&self, events: &[Arc<LogEvent>]) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut buf = String::new();
        for event in events {
            buf.push_str(&format_line(event, self.format));
            buf.push('\n');
        }
        let mut out = self.out.lock().await;
        out.write_all(buf.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.out.lock().await.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::record::sample_event;
    use chrono::{TimeZone, Utc};

    #[test]
    fn text_line_has_time_level_message_and_context() {
        let mut event = sample_event(Level::Information, "Tester requested weather");
        event.timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 15).unwrap();
        event.context.insert("request_id".into(), "r-1".into());

        let line = format_line(&event, ConsoleFormat::Text);
        assert_eq!(line, "[08:30:15 INF] Tester requested weather request_id=r-1");
    }

    #[test]
    fn text_line_does_not_repeat_call_site_properties() {
        let mut event = sample_event(Level::Information, "Tester requested weather at 2024-05-01T08:30:15Z");
        event.timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 15).unwrap();
        event.properties.insert("Time".into(), event.timestamp.into());
        event.context.insert("path".into(), "/weatherforecast".into());

        let line = format_line(&event, ConsoleFormat::Text);
        assert_eq!(
            line,
            "[08:30:15 INF] Tester requested weather at 2024-05-01T08:30:15Z path=/weatherforecast"
        );
        assert!(!line.contains("Time="));
    }

    #[test]
    fn json_line_keeps_call_site_properties() {
        let mut event = sample_event(Level::Information, "hi");
        event.properties.insert("Time".into(), "then".into());
        let parsed: serde_json::Value = serde_json::from_str(&format_line(&event, ConsoleFormat::Json)).unwrap();
        assert_eq!(parsed["Time"], "then");
    }

    #[test]
    fn json_line_is_clef() {
        let event = sample_event(Level::Error, "boom");
        let line = format_line(&event, ConsoleFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["@l"], "Error");
        assert_eq!(parsed["@m"], "boom");
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("JSON".parse::<ConsoleFormat>(), Ok(ConsoleFormat::Json));
        assert_eq!("text".parse::<ConsoleFormat>(), Ok(ConsoleFormat::Text));
        assert!("xml".parse::<ConsoleFormat>().is_err());
    }
}
