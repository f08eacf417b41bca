use crate::backend::BuildError;
use crate::enrich::Enricher;
use crate::layer::LoggerLayer;
use crate::level::Level;
use crate::record::{LogEvent, Properties, ScalarValue};
use crate::scope;
use crate::sink::LogSink;
use crate::template::MessageTemplate;
use crate::worker::{Batching, SinkWorker};
use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Targets whose events never enter the pipeline: the collector's own HTTP
/// stack.
pub const DEFAULT_IGNORED_TARGETS: &[&str] = &["hyper", "hyper_util", "h2", "reqwest", "rustls"];

/// Handle to the process-wide logging pipeline.
///
/// Clones share the same configuration, delivery tasks and counters; the
/// pipeline is fixed once built. `emit` and friends never wait on a sink:
/// events are queued per sink and dropped for that sink if its queue is
/// full.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
    source: Arc<str>,
}

struct Inner {
    minimum_level: Level,
    enrichers: Vec<Box<dyn Enricher>>,
    wants_ambient: bool,
    workers: Vec<SinkWorker>,
    ignored_targets: Vec<String>,
    emitted: AtomicU64,
    filtered: AtomicU64,
    dropped: AtomicU64,
}

/// Counter snapshot returned by [`Logger::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggerStats {
    /// Events built and handed to the sinks.
    pub emitted: u64,
    /// Direct calls rejected by the minimum level.
    pub filtered: u64,
    /// Per-sink deliveries skipped because that sink's queue was full.
    pub dropped: u64,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    pub fn minimum_level(&self) -> Level {
        self.inner.minimum_level
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.inner.minimum_level
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// A handle on the same pipeline whose events carry `source` as their
    /// target.
    pub fn for_source(&self, source: impl Into<String>) -> Logger {
        Logger {
            inner: Arc::clone(&self.inner),
            source: Arc::from(source.into()),
        }
    }

    /// Emit an event with named property values.
    pub fn emit(&self, level: Level, template: &str, properties: Properties) {
        if !self.is_enabled(level) {
            self.inner.filtered.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let template = MessageTemplate::parse(template);
        let message = template.render(&properties);
        self.dispatch(
            level,
            &self.source,
            template.text().to_string(),
            message,
            properties,
            &self.ambient(),
        );
    }

    /// Emit an event, binding `args` to the template's placeholders in order.
    pub fn log(&self, level: Level, template: &str, args: &[ScalarValue]) {
        if !self.is_enabled(level) {
            self.inner.filtered.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let template = MessageTemplate::parse(template);
        let properties = template.bind(args);
        let message = template.render(&properties);
        self.dispatch(
            level,
            &self.source,
            template.text().to_string(),
            message,
            properties,
            &self.ambient(),
        );
    }

    pub fn debug(&self, template: &str, args: &[ScalarValue]) {
        self.log(Level::Debug, template, args);
    }

    pub fn information(&self, template: &str, args: &[ScalarValue]) {
        self.log(Level::Information, template, args);
    }

    pub fn warning(&self, template: &str, args: &[ScalarValue]) {
        self.log(Level::Warning, template, args);
    }

    pub fn error(&self, template: &str, args: &[ScalarValue]) {
        self.log(Level::Error, template, args);
    }

    pub fn fatal(&self, template: &str, args: &[ScalarValue]) {
        self.log(Level::Fatal, template, args);
    }

    /// `tracing` layer feeding this pipeline. Install it on a
    /// [`Registry`](tracing_subscriber::Registry) so spans become ambient
    /// scopes.
    pub fn layer(&self) -> LoggerLayer {
        LoggerLayer::new(self.clone())
    }

    /// Wait until every sink has delivered what was queued before this call
    /// and flushed its own buffers.
    pub async fn flush(&self) {
        for worker in &self.inner.workers {
            worker.flush().await;
        }
    }

    pub fn stats(&self) -> LoggerStats {
        LoggerStats {
            emitted: self.inner.emitted.load(Ordering::Relaxed),
            filtered: self.inner.filtered.load(Ordering::Relaxed),
            dropped: self.inner.dropped.load(Ordering::Relaxed),
        }
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.inner.workers.iter().map(|w| w.name()).collect()
    }

    pub(crate) fn wants_ambient(&self) -> bool {
        self.inner.wants_ambient
    }

    fn ambient(&self) -> Properties {
        if self.inner.wants_ambient {
            scope::current()
        } else {
            Properties::new()
        }
    }

    pub(crate) fn ignores_target(&self, target: &str) -> bool {
        self.inner.ignored_targets.iter().any(|ignored| {
            target
                .strip_prefix(ignored.as_str())
                .map_or(false, |rest| rest.is_empty() || rest.starts_with("::"))
        })
    }

    /// Build the event, run the enrichers and fan it out. Level filtering
    /// has already happened.
    pub(crate) fn dispatch(
        &self,
        level: Level,
        target: &str,
        message_template: String,
        message: String,
        properties: Properties,
        ambient: &Properties,
    ) {
        let mut event = LogEvent {
            timestamp: Utc::now(),
            level,
            target: target.to_string(),
            message_template,
            message,
            properties,
            context: Properties::new(),
        };
        for enricher in &self.inner.enrichers {
            enricher.enrich(&mut event, ambient);
        }

        let event = Arc::new(event);
        self.inner.emitted.fetch_add(1, Ordering::Relaxed);
        for worker in &self.inner.workers {
            if !worker.offer(Arc::clone(&event)) {
                self.inner.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("minimum_level", &self.inner.minimum_level)
            .field("source", &self.source)
            .field("sinks", &self.sink_names())
            .finish()
    }
}

/// Fluent construction of a [`Logger`].
pub struct LoggerBuilder {
    minimum_level: Level,
    enrichers: Vec<Box<dyn Enricher>>,
    sinks: Vec<Arc<dyn LogSink>>,
    batching: Batching,
    ignored_targets: Vec<String>,
    source: String,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            minimum_level: Level::Information,
            enrichers: Vec::new(),
            sinks: Vec::new(),
            batching: Batching::default(),
            ignored_targets: DEFAULT_IGNORED_TARGETS.iter().map(|t| t.to_string()).collect(),
            source: env!("CARGO_PKG_NAME").replace('-', "_"),
        }
    }
}

impl LoggerBuilder {
    pub fn minimum_level(mut self, level: Level) -> Self {
        self.minimum_level = level;
        self
    }

    /// Enrichers run in registration order.
    pub fn enrich(mut self, enricher: impl Enricher + 'static) -> Self {
        self.enrichers.push(Box::new(enricher));
        self
    }

    pub fn write_to(self, sink: impl LogSink + 'static) -> Self {
        self.write_to_shared(Arc::new(sink))
    }

    pub fn write_to_shared(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn batching(mut self, batching: Batching) -> Self {
        self.batching = batching;
        self
    }

    pub fn ignore_target(mut self, target: impl Into<String>) -> Self {
        self.ignored_targets.push(target.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Spawn one delivery task per sink on the current Tokio runtime.
    pub fn build(self) -> Result<Logger, BuildError> {
        let runtime = Handle::try_current().map_err(|_| BuildError::NoRuntime)?;
        let workers = self
            .sinks
            .into_iter()
            .map(|sink| SinkWorker::spawn(sink, self.batching, &runtime).0)
            .collect();

        Ok(Logger {
            inner: Arc::new(Inner {
                minimum_level: self.minimum_level,
                wants_ambient: self.enrichers.iter().any(|e| e.uses_ambient()),
                enrichers: self.enrichers,
                workers,
                ignored_targets: self.ignored_targets,
                emitted: AtomicU64::new(0),
                filtered: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
            source: Arc::from(self.source),
        })
    }
}
