use crate::level::Level;
use crate::logger::Logger;
use crate::record::{Properties, ScalarValue};
use crate::scope::{self, ScopeFields};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns `tracing` events into
/// [`LogEvent`](crate::record::LogEvent)s and hands them to a [`Logger`].
///
/// Events below the logger's minimum level are disabled before they are
/// recorded. Spans are always enabled: their fields are captured into the
/// span's extensions and become the ambient context of everything logged
/// inside them.
pub struct LoggerLayer {
    logger: Logger,
}

impl LoggerLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    fn accepts(&self, meta: &Metadata<'_>) -> bool {
        self.logger.is_enabled(Level::from(meta.level())) && !self.logger.ignores_target(meta.target())
    }
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn enabled(&self, meta: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        !meta.is_event() || self.accepts(meta)
    }

    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = Properties::new();
        let mut message = None;
        attrs.record(&mut FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        });
        span.extensions_mut().insert(ScopeFields(fields));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(ScopeFields(fields)) = extensions.get_mut::<ScopeFields>() {
            let mut message = None;
            values.record(&mut FieldVisitor {
                fields,
                message: &mut message,
            });
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        // Other layers may have enabled a callsite this one rejects.
        if !self.accepts(meta) {
            return;
        }

        let mut properties = Properties::new();
        let mut message: Option<String> = None;
        event.record(&mut FieldVisitor {
            fields: &mut properties,
            message: &mut message,
        });

        let ambient = if self.logger.wants_ambient() {
            ctx.event_scope(event).map(scope::merge).unwrap_or_default()
        } else {
            Properties::new()
        };
        let message = message.unwrap_or_default();
        self.logger.dispatch(
            Level::from(meta.level()),
            meta.target(),
            message.clone(),
            message,
            properties,
            &ambient,
        );
    }
}

use tracing::field::{Field, Visit};

/// Collects `tracing` field values as [`ScalarValue`]s. The `message`
/// field is routed to `message` instead of `fields`.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Properties,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), ScalarValue::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), ScalarValue::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), ScalarValue::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), ScalarValue::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), ScalarValue::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), ScalarValue::Str(format!("{:?}", value)));
        }
    }
}
