use std::error::Error;
use std::time::Instant;

use async_trait::async_trait;
use weather_service::{LogEvent, LogSink, Logger};

/// Drops every event, so the numbers below measure the pipeline alone.
struct NullSink;

#[async_trait]
impl LogSink for NullSink {
    async fn send(&self, _event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let logger = Logger::builder().write_to(NullSink).build()?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        logger.information("default load test event {Iteration}", &[i.into()]);
    }

    let elapsed = start.elapsed();
    println!("default config: emitted {} events in {:?} (~{:.0} ev/s), {:?}",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64(),
        logger.stats(),
    );

    logger.flush().await;
    Ok(())
}
