//! Two independent tickers on one engine, stopped together by a shutdown
//! broadcast.

use anyhow::Result;
use colored::Colorize;
use std::time::Duration;
use tickloop::prelude::*;
use tokio::time;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    println!("Multiple tickers started");

    let engine = TickerEngine::new(EngineConfig::default());

    // Each ticker keeps its own cancel handle; the shutdown broadcast below
    // is what actually stops them.
    let (stop1, _cancel1) = StopCondition::manual();
    let (stop2, _cancel2) = StopCondition::manual();

    let first = engine
        .spawn_ticker(
            TickerSpec::new("ticker-1", Duration::from_secs(1)),
            stop1,
            |now| {
                println!("{} at: {now}", "Ticker1".cyan());
                Ok(())
            },
        )
        .await;

    let second = engine
        .spawn_ticker(
            TickerSpec::new("ticker-2", Duration::from_secs(2)),
            stop2,
            |now| {
                println!("{} at: {now}", "Ticker2".yellow());
                Ok(())
            },
        )
        .await;

    // One shutdown stops every ticker on the engine.
    let controller = engine.clone();
    tokio::spawn(async move {
        time::sleep(Duration::from_secs(5)).await;
        println!("Shutting down...");
        controller.shutdown();
    });

    first.join().await?;
    second.join().await?;
    println!("Stopping all tickers...");
    Ok(())
}
