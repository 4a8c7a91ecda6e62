//! A one-second ticker cancelled manually by a concurrent task.

use anyhow::Result;
use std::time::Duration;
use tickloop::prelude::*;
use tokio::time;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    println!("Ticker with manual cancellation started");

    let engine = TickerEngine::new(EngineConfig::default());
    let (stop, cancel) = StopCondition::manual();

    // Cancel from another task after three seconds.
    tokio::spawn(async move {
        time::sleep(Duration::from_secs(3)).await;
        println!("Cancelling ticker...");
        cancel.cancel();
    });

    let handle = engine
        .spawn_ticker(
            TickerSpec::new("cancellable", Duration::from_secs(1)),
            stop,
            |now| {
                println!("Tick at: {now}");
                Ok(())
            },
        )
        .await;

    handle.join().await?;
    println!("Cancelled. Stopping ticker...");
    Ok(())
}
