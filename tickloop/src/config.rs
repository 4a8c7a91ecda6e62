//! Defines all configuration structures for the Tickloop engine.
//!
//! These structs are designed to be deserialized from a configuration file
//! (e.g., a TOML file) using `serde`. This allows an application to define
//! its tickers and engine settings externally from the code; programs that
//! prefer fixed constants construct them directly.

use serde::Deserialize;
use std::time::Duration;

/// The top-level configuration for the [`TickerEngine`](crate::engine::TickerEngine).
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the engine's event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Tickers to start as soon as a host application boots the engine.
    #[serde(default)]
    pub tickers: Vec<TickerSpec>,
}

/// Describes one periodic ticker: a label for logs and events, and the
/// interval between fires.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerSpec {
    /// A human-readable label for debugging and logging purposes.
    pub label: String,

    /// Duration between tick fires, in milliseconds. Must be non-zero.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl TickerSpec {
    /// Creates a spec from a label and an interval.
    pub fn new(label: impl Into<String>, interval: Duration) -> Self {
        Self {
            label: label.into(),
            interval_ms: interval.as_millis() as u64,
        }
    }

    /// The interval between tick fires.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl EngineConfig {
    /// Loads configuration from an optional `tickloop.toml` in the working
    /// directory, with `TICKLOOP_*` environment variables taking precedence.
    /// A missing file yields the defaults.
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("tickloop").required(false))
            .add_source(config::Environment::with_prefix("TICKLOOP"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
            tickers: Vec::new(),
        }
    }
}

// --- Default value functions for serde ---

fn default_event_capacity() -> usize {
    256
}

fn default_interval_ms() -> u64 {
    1_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_interval_round_trips() {
        let spec = TickerSpec::new("heartbeat", Duration::from_millis(1500));
        assert_eq!(spec.interval(), Duration::from_millis(1500));
    }

    #[test]
    fn defaults_apply_when_fields_are_omitted() {
        let config: EngineConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "tickers = [{ label = \"preset\" }]",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.event_capacity, 256);
        assert_eq!(config.tickers.len(), 1);
        assert_eq!(config.tickers[0].label, "preset");
        assert_eq!(config.tickers[0].interval_ms, 1_000);
    }
}
