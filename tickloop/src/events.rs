//! Defines all public event types broadcast by the Tickloop engine.
//!
//! This module acts as the public API for the engine's event system.
//! Listeners subscribe to the engine's stream and receive these
//! strongly-typed events to perform their work.

use crate::common::TickerId;
use chrono::{DateTime, Local};
use std::fmt;

/// Events describing the lifecycle of tickers running inside an engine.
#[derive(Debug, Clone)]
pub enum TickerEvent {
    /// Fired once when a ticker is registered and its task is spawned.
    Started { id: TickerId, label: String },
    /// Fired on every tick boundary, carrying the captured fire timestamp.
    Tick {
        id: TickerId,
        seq: u64,
        timestamp: DateTime<Local>,
    },
    /// Fired when a tick callback reports a fault.
    Faulted { id: TickerId, message: String },
    /// Fired when a supervised ticker starts a fresh instance after a fault.
    Restarted { id: TickerId, restarts: u32 },
    /// Fired once when a ticker's loop has exited and its interval has been
    /// released.
    Stopped { id: TickerId, reason: StopReason },
}

/// Why a ticker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The paired cancel handle fired, or the engine's kill switch did.
    Cancelled,
    /// The absolute deadline was reached.
    DeadlineReached,
    /// The relative timeout elapsed.
    TimedOut,
    /// The external one-shot source signalled.
    ExternalSignal,
    /// The engine broadcast a shutdown to every running ticker.
    Shutdown,
    /// An unsupervised tick callback faulted.
    Faulted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::Cancelled => "cancelled",
            StopReason::DeadlineReached => "deadline reached",
            StopReason::TimedOut => "timed out",
            StopReason::ExternalSignal => "external signal",
            StopReason::Shutdown => "engine shutdown",
            StopReason::Faulted => "faulted",
        };
        f.write_str(text)
    }
}
