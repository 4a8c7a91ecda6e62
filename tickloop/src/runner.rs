//! The per-ticker run loop.

use crate::common::{TickFn, TickerId};
use crate::events::{StopReason, TickerEvent};
use crate::stop::StopCondition;
use chrono::Local;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

/// How one loop instance ended.
pub(crate) enum RunOutcome {
    Stopped(StopReason),
    Fault(anyhow::Error),
}

/// Drives one ticker instance until a stop path wins the race against the
/// next tick, or until the tick callback faults.
///
/// The `Interval` is created and owned here, so every exit path releases it
/// exactly once. The `select!` below is unbiased: when a tick and a stop
/// become ready together, either may be handled first.
pub(crate) async fn run_loop(
    id: TickerId,
    label: &str,
    interval: Duration,
    events: &broadcast::Sender<TickerEvent>,
    mut on_tick: TickFn,
    stop: &mut StopCondition,
    kill: &mut watch::Receiver<bool>,
    shutdown: &mut broadcast::Receiver<()>,
    seq: &mut u64,
) -> RunOutcome {
    // The first fire lands one full interval after start; a tick that the
    // callback overruns is dropped, not bunched onto the next one.
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                *seq += 1;
                let now = Local::now();
                trace!("[{label}] tick #{seq}");
                events
                    .send(TickerEvent::Tick { id, seq: *seq, timestamp: now })
                    .ok();
                if let Err(err) = (on_tick)(now) {
                    return RunOutcome::Fault(err);
                }
            }
            reason = stop.wait() => {
                return RunOutcome::Stopped(reason);
            }
            res = kill.changed() => {
                if res.is_err() || *kill.borrow() {
                    return RunOutcome::Stopped(StopReason::Cancelled);
                }
            }
            _ = shutdown.recv() => {
                return RunOutcome::Stopped(StopReason::Shutdown);
            }
        }
    }
}
