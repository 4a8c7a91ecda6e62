//! A one-second ticker stopped at an absolute deadline.

use anyhow::Result;
use std::time::Duration;
use tickloop::prelude::*;
use tokio::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    println!("Ticker with deadline started");

    let engine = TickerEngine::new(EngineConfig::default());

    // The instant five seconds from now, fixed before the ticker starts.
    let deadline = Instant::now() + Duration::from_secs(5);

    let handle = engine
        .spawn_ticker(
            TickerSpec::new("deadline", Duration::from_secs(1)),
            StopCondition::deadline(deadline),
            |now| {
                println!("Tick at: {now}");
                Ok(())
            },
        )
        .await;

    handle.join().await?;
    println!("Deadline reached. Stopping ticker...");
    Ok(())
}
