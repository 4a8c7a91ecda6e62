//! A one-second ticker stopped by a relative timeout.

use anyhow::Result;
use std::time::Duration;
use tickloop::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    println!("Ticker with timeout started");

    let engine = TickerEngine::new(EngineConfig::default());

    let handle = engine
        .spawn_ticker(
            TickerSpec::new("timeout", Duration::from_secs(1)),
            StopCondition::timeout(Duration::from_secs(5)),
            |now| {
                println!("Tick at: {now}");
                Ok(())
            },
        )
        .await;

    handle.join().await?;
    println!("Timeout reached. Stopping ticker...");
    Ok(())
}
