//! Shared identifiers and callback aliases used across the crate.

use anyhow::Result;
use chrono::{DateTime, Local};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies one running ticker inside an engine's registry.
    pub struct TickerId;
}

/// A tick callback. Invoked on every tick boundary with the captured fire
/// timestamp; an `Err` is a fault and ends the current ticker instance.
pub type TickFn = Box<dyn FnMut(DateTime<Local>) -> Result<()> + Send>;

/// Builds a fresh tick callback for each started instance of a supervised
/// ticker.
pub type TickFactory = Box<dyn FnMut() -> TickFn + Send>;
