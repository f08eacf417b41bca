use std::error::Error;
use std::time::Instant;

use async_trait::async_trait;
use tokio::time::Duration;
use weather_service::enrich::FromLogContext;
use weather_service::init::install;
use weather_service::worker::Batching;
use weather_service::{Level, LogEvent, LogSink, Logger};

struct NullSink;

#[async_trait]
impl LogSink for NullSink {
    async fn send(&self, _event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

/// Same load as `default_load`, but through `tracing` macros inside a span
/// and with a larger queue.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let logger = Logger::builder()
        .minimum_level(Level::Debug)
        .enrich(FromLogContext)
        .batching(Batching::new(50_000, 1_000, Duration::from_millis(200)))
        .write_to(NullSink)
        .build()?;
    install(&logger)?;

    let n: u64 = 100_000;
    let span = tracing::info_span!("load", run = "custom");
    let _entered = span.enter();
    let start = Instant::now();

    for i in 0..n {
        tracing::info!(iteration = i, "custom load test event");
    }

    let elapsed = start.elapsed();
    println!("custom config: emitted {} events in {:?} (~{:.0} ev/s), {:?}",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64(),
        logger.stats(),
    );

    logger.flush().await;
    Ok(())
}
