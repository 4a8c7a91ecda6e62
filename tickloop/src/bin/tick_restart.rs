//! A supervised ticker job that faults on a schedule and restarts itself.

use anyhow::{bail, Result};
use chrono::Timelike;
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

    println!("Ticker job with automatic restart started");

    let engine = TickerEngine::new(EngineConfig::default());

    // Report faults and restarts as they happen.
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                TickerEvent::Faulted { message, .. } => {
                    println!("{} {message}", "Fault occurred:".red());
                }
                TickerEvent::Restarted { restarts, .. } => {
                    println!("Restarting ticker job (restart #{restarts})");
                }
                _ => {}
            }
        }
    });

    let (stop, _cancel) = StopCondition::manual();
    let handle = engine
        .spawn_supervised(
            TickerSpec::new("job", Duration::from_secs(2)),
            stop,
            || {
                Box::new(|now| {
                    println!("Ticker job ran at: {now}");
                    // The injected failure: any timestamp whose seconds
                    // value is a multiple of ten.
                    if now.second() % 10 == 0 {
                        bail!("unexpected error at {}", now.format("%H:%M:%S"));
                    }
                    Ok(())
                })
            },
        )
        .await;

    // The run's total length is decided here, not by the job.
    time::sleep(Duration::from_secs(30)).await;
    engine.shutdown();
    handle.join().await?;
    println!("Main loop finished");
    Ok(())
}
