use crate::record::LogEvent;
use crate::sink::LogSink;
use async_trait::async_trait;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// A sink that keeps every event it receives in memory.
///
/// Useful for asserting on what the pipeline produced without any external
/// I/O. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far, in delivery order.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

#[async_trait]
impl LogSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn send(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.events
            .lock()
            .map_err(|_| "memory sink poisoned")?
            .push(event.clone());
        Ok(())
    }
}
