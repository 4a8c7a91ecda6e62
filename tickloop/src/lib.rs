//! # Tickloop
//!
//! An event-driven periodic task engine for Rust.
//!
//! Tickloop runs callbacks on a fixed interval until a stop condition fires,
//! and broadcasts strongly-typed events describing everything its tickers do.
//! It is designed as a library that an application uses to manage recurring,
//! cancellable work without hand-rolling timer loops.
//!
//! ## Core Concepts
//!
//! - **TickerEngine**: the central handle. It registers tickers, tracks them
//!   in a registry, and owns the event and shutdown channels. The engine is
//!   cheap to clone and share across tasks.
//! - **StopCondition**: when a ticker stops. Four variants: a manual cancel
//!   handle, an absolute deadline, a relative timeout, or an external
//!   one-shot signal. Each produces its stop notification at most once.
//! - **Event-Driven**: every tick, stop, fault, and restart is broadcast as
//!   a [`TickerEvent`](events::TickerEvent). Your application subscribes to
//!   the stream to observe or render them.
//! - **Supervision**: a supervised ticker survives faults in its callback.
//!   The faulted instance is released, the fault is reported, and a fresh
//!   instance starts immediately with the same configuration.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tickloop::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Create an engine with the default configuration.
//!     let engine = TickerEngine::new(EngineConfig::default());
//!
//!     // 2. Subscribe to the event stream before spawning tickers.
//!     let mut events = engine.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Received event: {:?}", event);
//!         }
//!     });
//!
//!     // 3. Run a one-second ticker for five seconds.
//!     let handle = engine
//!         .spawn_ticker(
//!             TickerSpec::new("heartbeat", Duration::from_secs(1)),
//!             StopCondition::timeout(Duration::from_secs(5)),
//!             |now| {
//!                 println!("Tick at: {now}");
//!                 Ok(())
//!             },
//!         )
//!         .await;
//!
//!     // 4. Wait for the stop condition to win the race.
//!     let reason = handle.join().await?;
//!     println!("Ticker stopped: {reason}");
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Tickloop Engine";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Declare all the modules in the crate.
pub mod common;
pub mod config;
pub mod engine;
pub mod events;
mod runner;
pub mod stop;

/// A prelude module for easy importing of the most common Tickloop types.
pub mod prelude {
    pub use crate::common::{TickFn, TickerId};
    pub use crate::config::{EngineConfig, TickerSpec};
    pub use crate::engine::{TickerEngine, TickerHandle};
    pub use crate::events::{StopReason, TickerEvent};
    pub use crate::stop::{CancelHandle, StopCondition};
}
