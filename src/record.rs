use crate::level::Level;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Named values attached to an event, either by the call site or by an
/// enricher.
pub type Properties = BTreeMap<String, ScalarValue>;

/// A single property value. Only scalars are captured.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    Timestamp(DateTime<Utc>),
}

impl ScalarValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ScalarValue::Null => serde_json::Value::Null,
            ScalarValue::Bool(b) => serde_json::Value::from(*b),
            ScalarValue::I64(n) => serde_json::Value::from(*n),
            ScalarValue::U64(n) => serde_json::Value::from(*n),
            ScalarValue::F64(n) => serde_json::Value::from(*n),
            ScalarValue::Str(s) => serde_json::Value::String(s.clone()),
            ScalarValue::Timestamp(t) => serde_json::Value::String(format_timestamp(t)),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => f.write_str("null"),
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::I64(n) => write!(f, "{}", n),
            ScalarValue::U64(n) => write!(f, "{}", n),
            ScalarValue::F64(n) => write!(f, "{}", n),
            ScalarValue::Str(s) => f.write_str(s),
            ScalarValue::Timestamp(t) => f.write_str(&format_timestamp(t)),
        }
    }
}

fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Str(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Str(v)
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::I64(v.into())
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::I64(v)
    }
}

impl From<u32> for ScalarValue {
    fn from(v: u32) -> Self {
        ScalarValue::U64(v.into())
    }
}

impl From<u64> for ScalarValue {
    fn from(v: u64) -> Self {
        ScalarValue::U64(v)
    }
}

impl From<usize> for ScalarValue {
    fn from(v: usize) -> Self {
        ScalarValue::U64(v as u64)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::F64(v)
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(v: DateTime<Utc>) -> Self {
        ScalarValue::Timestamp(v)
    }
}

impl From<DateTime<Local>> for ScalarValue {
    fn from(v: DateTime<Local>) -> Self {
        ScalarValue::Timestamp(v.with_timezone(&Utc))
    }
}

/// One structured logging call, immutable once built and shared by every
/// sink it is fanned out to.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    /// Logger category: the `tracing` target, or the source a [`Logger`]
    /// handle was created for.
    ///
    /// [`Logger`]: crate::logger::Logger
    pub target: String,
    pub message_template: String,
    /// Template rendered against `properties`.
    pub message: String,
    /// Values supplied by the call site.
    pub properties: Properties,
    /// Values attached by enrichers.
    pub context: Properties,
}

impl LogEvent {
    /// Look a property up, call-site values first.
    pub fn property(&self, name: &str) -> Option<&ScalarValue> {
        self.properties.get(name).or_else(|| self.context.get(name))
    }

    /// Compact log event format: one JSON object per event, reified fields
    /// prefixed with `@`. Call-site properties win over context on a name
    /// clash.
    pub fn to_clef(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        obj.insert("@t".into(), serde_json::Value::String(format_timestamp(&self.timestamp)));
        obj.insert("@mt".into(), serde_json::Value::String(self.message_template.clone()));
        obj.insert("@m".into(), serde_json::Value::String(self.message.clone()));
        obj.insert("@l".into(), serde_json::Value::String(self.level.as_str().to_string()));

        for (name, value) in self.context.iter().chain(self.properties.iter()) {
            obj.insert(escape_clef_name(name), value.to_json());
        }
        obj.entry("SourceContext")
            .or_insert_with(|| serde_json::Value::String(self.target.clone()));

        serde_json::Value::Object(obj)
    }
}

fn escape_clef_name(name: &str) -> String {
    if name.starts_with('@') {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
pub(crate) fn sample_event(level: Level, message: &str) -> LogEvent {
    LogEvent {
        timestamp: Utc::now(),
        level,
        target: "weather_service::tests".to_string(),
        message_template: message.to_string(),
        message: message.to_string(),
        properties: Properties::new(),
        context: Properties::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn clef_carries_reified_fields_and_properties() {
        let mut event = sample_event(Level::Warning, "disk at 93%");
        event.timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        event.properties.insert("Percent".into(), 93.into());
        event.context.insert("request_id".into(), "abc".into());

        let clef = event.to_clef();
        assert_eq!(clef["@t"], "2024-05-01T12:00:00Z");
        assert_eq!(clef["@l"], "Warning");
        assert_eq!(clef["@m"], "disk at 93%");
        assert_eq!(clef["Percent"], 93);
        assert_eq!(clef["request_id"], "abc");
        assert_eq!(clef["SourceContext"], "weather_service::tests");
    }

    #[test]
    fn clef_properties_override_context_and_escape_at_names() {
        let mut event = sample_event(Level::Information, "x");
        event.context.insert("User".into(), "outer".into());
        event.properties.insert("User".into(), "call-site".into());
        event.properties.insert("@x".into(), 1.into());

        let clef = event.to_clef();
        assert_eq!(clef["User"], "call-site");
        assert_eq!(clef["@@x"], 1);
        assert_eq!(event.property("User"), Some(&ScalarValue::from("call-site")));
    }

    #[test]
    fn timestamps_display_as_rfc3339_utc() {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(ScalarValue::from(t).to_string(), "2024-01-02T03:04:05Z");
    }
}
