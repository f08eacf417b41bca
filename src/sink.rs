use crate::record::LogEvent;
use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;

/// Asynchronous destination for [`LogEvent`]s produced by the logger.
///
/// Implementations transport events to a concrete backend (stdout, a remote
/// collector, memory). The logger calls them from a background delivery
/// task and never awaits them on the caller's thread.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Short name used when reporting delivery failures.
    fn name(&self) -> &str {
        "sink"
    }

    /// Send a single event to the underlying backend.
    ///
    /// **Returns**
    /// - `Ok(())` if the event was accepted by the backend.
    /// - `Err(..)` if the backend failed (network error, serialization
    ///   error, HTTP status, etc). The delivery task reports the failure
    ///   and discards the event; there is no retry.
    async fn send(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Send a batch collected by the delivery task.
    ///
    /// The default implementation sends events one by one, keeps going
    /// past failures and returns the first error seen. Backends with a
    /// native batch format should override it.
    async fn send_batch(&self, events: &[Arc<LogEvent>]) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut first_err = None;
        for event in events {
            if let Err(e) = self.send(event).await {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Flush any buffered events, if the backend implements buffering.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
