use crate::record::{LogEvent, Properties, ScalarValue};

/// A stage that adds contextual properties to an event before it reaches
/// the sinks.
pub trait Enricher: Send + Sync {
    /// `ambient` is the merged field set of the spans enclosing the call,
    /// inner spans already overriding outer ones.
    fn enrich(&self, event: &mut LogEvent, ambient: &Properties);

    /// Whether `enrich` reads `ambient`. When no enricher does, the span
    /// context is never collected.
    fn uses_ambient(&self) -> bool {
        false
    }
}

/// Attaches the ambient span context to every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct FromLogContext;

impl Enricher for FromLogContext {
    fn enrich(&self, event: &mut LogEvent, ambient: &Properties) {
        for (name, value) in ambient {
            event.context.insert(name.clone(), value.clone());
        }
    }

    fn uses_ambient(&self) -> bool {
        true
    }
}

/// Attaches a fixed property unless the event already has one by that name.
#[derive(Debug, Clone)]
pub struct WithProperty {
    name: String,
    value: ScalarValue,
}

impl WithProperty {
    pub fn new(name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Enricher for WithProperty {
    fn enrich(&self, event: &mut LogEvent, _ambient: &Properties) {
        if event.property(&self.name).is_none() {
            event.context.insert(self.name.clone(), self.value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::record::sample_event;

    #[test]
    fn from_log_context_copies_ambient_pairs() {
        let mut ambient = Properties::new();
        ambient.insert("request_id".into(), "r-7".into());
        let mut event = sample_event(Level::Information, "hi");

        FromLogContext.enrich(&mut event, &ambient);
        assert_eq!(event.context.get("request_id"), Some(&ScalarValue::from("r-7")));
    }

    #[test]
    fn with_property_does_not_overwrite() {
        let mut event = sample_event(Level::Information, "hi");
        event.properties.insert("Application".into(), "caller".into());

        WithProperty::new("Application", "weather").enrich(&mut event, &Properties::new());
        assert!(event.context.get("Application").is_none());

        let mut bare = sample_event(Level::Information, "hi");
        WithProperty::new("Application", "weather").enrich(&mut bare, &Properties::new());
        assert_eq!(bare.context.get("Application"), Some(&ScalarValue::from("weather")));
    }
}
