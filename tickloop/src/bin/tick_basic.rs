//! A one-second ticker stopped by an independent one-shot timer.

use anyhow::Result;
use std::time::Duration;
use tickloop::prelude::*;
use tokio::sync::oneshot;
use tokio::time;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    println!("Ticker example started");

    // 2. Create the engine.
    let engine = TickerEngine::new(EngineConfig::default());

    // 3. An unrelated one-shot timer; the ticker does not own it.
    let (stop_tx, stop_rx) = oneshot::channel();
    tokio::spawn(async move {
        time::sleep(Duration::from_secs(5)).await;
        let _ = stop_tx.send(());
    });

    // 4. Tick every second until the timer elapses.
    let handle = engine
        .spawn_ticker(
            TickerSpec::new("basic", Duration::from_secs(1)),
            StopCondition::external(stop_rx),
            |now| {
                println!("Tick at: {now}");
                Ok(())
            },
        )
        .await;

    handle.join().await?;
    println!("Stopping ticker...");
    Ok(())
}
