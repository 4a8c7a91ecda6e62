//! The core engine that spawns, tracks, and stops periodic tickers.

use crate::common::{TickFactory, TickFn, TickerId};
use crate::config::{EngineConfig, TickerSpec};
use crate::events::{StopReason, TickerEvent};
use crate::runner::{run_loop, RunOutcome};
use crate::stop::StopCondition;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use slotmap::SlotMap;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// A ticker's registry entry: its label and the cooperative kill switch the
/// engine flips when asked to stop it by id.
struct RunningTicker {
    label: String,
    kill: watch::Sender<bool>,
}

/// How a spawned ticker reacts to a fault in its callback.
enum TickMode {
    /// The fault ends the ticker.
    Single(TickFn),
    /// The fault is reported and a fresh instance starts immediately.
    Supervised(TickFactory),
}

/// The main Tickloop engine.
///
/// This struct is the central point of control. It holds the engine's
/// configuration, tracks every running ticker in a registry, and owns the
/// event and shutdown broadcast channels. The `TickerEngine` is designed to
/// be cloned and shared across tasks, providing a handle to the running
/// instance.
///
/// Dropping the last engine clone closes the shutdown channel, which running
/// tickers observe as an engine shutdown.
#[derive(Clone)]
pub struct TickerEngine {
    config: Arc<EngineConfig>,
    event_sender: broadcast::Sender<TickerEvent>,
    shutdown_tx: broadcast::Sender<()>,
    tickers: Arc<RwLock<SlotMap<TickerId, RunningTicker>>>,
}

impl TickerEngine {
    /// Creates a new `TickerEngine` with the given configuration.
    ///
    /// # Panics
    /// Panics if `config.event_capacity` is zero.
    pub fn new(config: EngineConfig) -> Self {
        let (event_sender, _) = broadcast::channel(config.event_capacity);
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config: Arc::new(config),
            event_sender,
            shutdown_tx,
            tickers: Arc::new(RwLock::new(SlotMap::with_key())),
        }
    }

    /// Tickers declared in the engine's configuration, for a host
    /// application to start at boot.
    pub fn preconfigured(&self) -> &[TickerSpec] {
        &self.config.tickers
    }

    /// Spawns a ticker that invokes `on_tick` every `spec.interval()` until
    /// `stop` fires.
    ///
    /// The ticker runs on its own task; the caller continues independently
    /// and may `join` the returned handle to wait for the stop. An `Err`
    /// from `on_tick` is a fault and ends the ticker with
    /// [`StopReason::Faulted`].
    ///
    /// # Arguments
    /// * `spec` - Label and interval for the new ticker.
    /// * `stop` - The condition that ends it.
    /// * `on_tick` - Callback invoked with each tick's fire timestamp.
    ///
    /// # Returns
    /// A [`TickerHandle`] identifying the running ticker.
    ///
    /// # Panics
    /// Panics if `spec.interval()` is zero.
    pub async fn spawn_ticker<F>(
        &self,
        spec: TickerSpec,
        stop: StopCondition,
        on_tick: F,
    ) -> TickerHandle
    where
        F: FnMut(DateTime<Local>) -> Result<()> + Send + 'static,
    {
        self.spawn_inner(spec, stop, TickMode::Single(Box::new(on_tick)))
            .await
    }

    /// Spawns a supervised ticker: a fault in the callback is reported and
    /// a brand-new instance starts immediately with identical
    /// configuration.
    ///
    /// `make_tick` builds the callback for each instance, so restarted
    /// instances begin from a fresh closure. Retries are unbounded and
    /// immediate; only the stop condition (which persists across restarts),
    /// the engine kill switch, or a shutdown ends the run.
    pub async fn spawn_supervised<F>(
        &self,
        spec: TickerSpec,
        stop: StopCondition,
        make_tick: F,
    ) -> TickerHandle
    where
        F: FnMut() -> TickFn + Send + 'static,
    {
        self.spawn_inner(spec, stop, TickMode::Supervised(Box::new(make_tick)))
            .await
    }

    async fn spawn_inner(
        &self,
        spec: TickerSpec,
        mut stop: StopCondition,
        mode: TickMode,
    ) -> TickerHandle {
        let label = spec.label.clone();
        let interval = spec.interval();
        let (kill_tx, mut kill_rx) = watch::channel(false);

        let id = self.tickers.write().await.insert(RunningTicker {
            label: label.clone(),
            kill: kill_tx,
        });
        info!("[{label}] ticker registered, firing every {interval:?}");
        self.event_sender
            .send(TickerEvent::Started {
                id,
                label: label.clone(),
            })
            .ok();

        let events = self.event_sender.clone();
        let tickers = Arc::clone(&self.tickers);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let join = tokio::spawn(async move {
            let mut seq = 0u64;
            let reason = match mode {
                TickMode::Single(on_tick) => {
                    let outcome = run_loop(
                        id,
                        &label,
                        interval,
                        &events,
                        on_tick,
                        &mut stop,
                        &mut kill_rx,
                        &mut shutdown_rx,
                        &mut seq,
                    )
                    .await;
                    match outcome {
                        RunOutcome::Stopped(reason) => reason,
                        RunOutcome::Fault(err) => {
                            error!("[{label}] tick callback failed: {err:#}");
                            events
                                .send(TickerEvent::Faulted {
                                    id,
                                    message: format!("{err:#}"),
                                })
                                .ok();
                            StopReason::Faulted
                        }
                    }
                }
                TickMode::Supervised(mut make_tick) => {
                    let mut restarts = 0u32;
                    loop {
                        let on_tick = make_tick();
                        let outcome = run_loop(
                            id,
                            &label,
                            interval,
                            &events,
                            on_tick,
                            &mut stop,
                            &mut kill_rx,
                            &mut shutdown_rx,
                            &mut seq,
                        )
                        .await;
                        match outcome {
                            RunOutcome::Stopped(reason) => break reason,
                            RunOutcome::Fault(err) => {
                                warn!("[{label}] tick callback failed, restarting: {err:#}");
                                events
                                    .send(TickerEvent::Faulted {
                                        id,
                                        message: format!("{err:#}"),
                                    })
                                    .ok();
                                restarts += 1;
                                events.send(TickerEvent::Restarted { id, restarts }).ok();
                            }
                        }
                    }
                }
            };

            tickers.write().await.remove(id);
            info!("[{label}] ticker stopped: {reason}");
            events.send(TickerEvent::Stopped { id, reason }).ok();
            reason
        });

        TickerHandle { id, join }
    }

    /// Flips the kill switch of a running ticker.
    ///
    /// Returns `true` if the ticker was found. The stop is cooperative: the
    /// ticker observes it at its next suspension point and then releases its
    /// interval before its handle resolves. Repeated calls are no-ops.
    pub async fn stop_ticker(&self, id: TickerId) -> bool {
        match self.tickers.read().await.get(id) {
            Some(entry) => {
                entry.kill.send_replace(true);
                true
            }
            None => false,
        }
    }

    /// Returns `true` while the ticker's registry entry exists. The entry is
    /// removed before the ticker's handle resolves.
    pub async fn is_running(&self, id: TickerId) -> bool {
        self.tickers.read().await.contains_key(id)
    }

    /// Ids and labels of every running ticker.
    pub async fn active_tickers(&self) -> Vec<(TickerId, String)> {
        self.tickers
            .read()
            .await
            .iter()
            .map(|(id, entry)| (id, entry.label.clone()))
            .collect()
    }

    /// Broadcasts a shutdown to every running ticker. Each one stops with
    /// [`StopReason::Shutdown`] at its next suspension point.
    pub fn shutdown(&self) {
        self.shutdown_tx.send(()).ok();
    }

    /// Subscribes to the [`TickerEvent`] stream.
    pub fn subscribe(&self) -> broadcast::Receiver<TickerEvent> {
        self.event_sender.subscribe()
    }
}

/// A handle to one spawned ticker.
pub struct TickerHandle {
    id: TickerId,
    join: JoinHandle<StopReason>,
}

impl TickerHandle {
    /// The ticker's id in its engine's registry.
    pub fn id(&self) -> TickerId {
        self.id
    }

    /// Waits until the ticker has stopped and its resources are released,
    /// and returns why it stopped.
    pub async fn join(self) -> Result<StopReason> {
        self.join.await.context("ticker task terminated abnormally")
    }
}
