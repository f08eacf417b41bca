use crate::record::LogEvent;
use crate::sink::LogSink;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Largest accepted per-sink queue.
pub const MAX_BUFFER: usize = 1 << 20;

/// Largest accepted delivery batch.
pub const MAX_BATCH_SIZE: usize = 1 << 16;

/// Longest accepted wait before a partial batch is delivered.
pub const MAX_FLUSH_INTERVAL: Duration = Duration::from_secs(3600);

/// Queue and batch sizing for a sink's delivery task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Batching {
    /// Events queued per sink before new ones are dropped.
    pub buffer: usize,
    /// Events handed to the sink in one `send_batch` call.
    pub batch_size: usize,
    /// Longest time a partial batch waits before delivery.
    pub flush_interval: Duration,
}

impl Batching {
    /// Values are clamped to `16..=MAX_BUFFER`, `1..=MAX_BATCH_SIZE` (and
    /// never above `buffer`) and `10ms..=MAX_FLUSH_INTERVAL`.
    pub fn new(buffer: usize, batch_size: usize, flush_interval: Duration) -> Self {
        let buffer = buffer.clamp(16, MAX_BUFFER);
        Self {
            buffer,
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE.min(buffer)),
            flush_interval: flush_interval.clamp(Duration::from_millis(10), MAX_FLUSH_INTERVAL),
        }
    }
}

impl Default for Batching {
    fn default() -> Self {
        Self::new(1024, 128, Duration::from_secs(1))
    }
}

pub(crate) enum Command {
    Event(Arc<LogEvent>),
    /// Deliver everything queued before this command, flush the sink, then ack.
    Flush(oneshot::Sender<()>),
}

/// Sending half of one sink's bounded queue. The task on the other end
/// exits once every `SinkWorker` clone is gone and the queue is drained.
pub(crate) struct SinkWorker {
    name: String,
    sender: mpsc::Sender<Command>,
}

impl SinkWorker {
    pub(crate) fn spawn(sink: Arc<dyn LogSink>, batching: Batching, runtime: &Handle) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Command>(batching.buffer);
        let name = sink.name().to_string();
        let task_name = name.clone();

        let handle = runtime.spawn(async move {
            let mut batch: Vec<Arc<LogEvent>> = Vec::with_capacity(batching.batch_size.min(batching.buffer));
            let mut ticker = interval(batching.flush_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    cmd = rx.recv() => match cmd {
                        Some(Command::Event(event)) => {
                            batch.push(event);
                            if batch.len() >= batching.batch_size {
                                deliver(&*sink, &task_name, &mut batch).await;
                            }
                        }
                        Some(Command::Flush(ack)) => {
                            deliver(&*sink, &task_name, &mut batch).await;
                            flush(&*sink, &task_name).await;
                            let _ = ack.send(());
                        }
                        None => {
                            deliver(&*sink, &task_name, &mut batch).await;
                            flush(&*sink, &task_name).await;
                            break;
                        }
                    },
                    _ = ticker.tick() => {
                        if !batch.is_empty() {
                            deliver(&*sink, &task_name, &mut batch).await;
                        }
                    }
                }
            }
        });

        (Self { name, sender: tx }, handle)
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue without waiting. `false` means the queue was full or the
    /// task is gone and the event was not taken.
    pub(crate) fn offer(&self, event: Arc<LogEvent>) -> bool {
        self.sender.try_send(Command::Event(event)).is_ok()
    }

    pub(crate) async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.sender.send(Command::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }
}

/// Fire-and-forget: a failed batch is reported on stderr, never back into
/// the pipeline, and discarded.
async fn deliver(sink: &dyn LogSink, name: &str, batch: &mut Vec<Arc<LogEvent>>) {
    if batch.is_empty() {
        return;
    }
    if let Err(e) = sink.send_batch(batch.as_slice()).await {
        eprintln!("log sink `{}` failed to deliver {} event(s): {}", name, batch.len(), e);
    }
    batch.clear();
}

async fn flush(sink: &dyn LogSink, name: &str) {
    if let Err(e) = sink.flush().await {
        eprintln!("log sink `{}` failed to flush: {}", name, e);
    }
}
