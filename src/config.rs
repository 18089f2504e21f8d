//! # config — reads simulator and server settings from environment variables
//!
//! Missing or unparsable values fall back to the defaults below.

use std::time::Duration;

use tracing::warn;

use crate::models::VolatilityLevel;

/// Longest accepted fill, settle or journal delay (one day).
pub const MAX_DELAY_MS: u64 = 86_400_000;

#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Address the monitor server binds to.
    pub bind_addr:         String,
    /// Minimum gap between two ticks' state mutations.
    pub tick_interval_ms:  u64,
    /// How often the driver pumps the engine; may be much shorter than a tick.
    pub frame_interval_ms: u64,
    /// Order-fill latency (`entering` → `active`).
    pub fill_delay_ms:     u64,
    /// Exit hit → trade moved into the journal.
    pub settle_delay_ms:   u64,
    /// Settlement → journal notice (fade-out window).
    pub journal_delay_ms:  u64,
    pub volatility:        VolatilityLevel,
    /// Fixed RNG seed for reproducible runs.
    pub seed:              Option<u64>,
    /// Start ticking as soon as the engine is built.
    pub autostart:         bool,
    /// Capacity of the monitor broadcast channel.
    pub event_buffer:      usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            bind_addr:         "0.0.0.0:3000".to_string(),
            tick_interval_ms:  1000,
            frame_interval_ms: 16,
            fill_delay_ms:     1000,
            settle_delay_ms:   2000,
            journal_delay_ms:  2000,
            volatility:        VolatilityLevel::Medium,
            seed:              None,
            autostart:         true,
            event_buffer:      256,
        }
    }
}

impl SimConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let volatility = match std::env::var("SIM_VOLATILITY") {
            Ok(raw) => raw.parse().unwrap_or_else(|err| {
                warn!(%err, "SIM_VOLATILITY ignored — using {}", defaults.volatility);
                defaults.volatility
            }),
            Err(_) => defaults.volatility,
        };

        Self {
            bind_addr:         std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            tick_interval_ms:  env_u64("SIM_TICK_INTERVAL_MS", defaults.tick_interval_ms).max(1),
            frame_interval_ms: env_u64("SIM_FRAME_INTERVAL_MS", defaults.frame_interval_ms).max(1),
            fill_delay_ms:     env_delay("SIM_FILL_DELAY_MS", defaults.fill_delay_ms),
            settle_delay_ms:   env_delay("SIM_SETTLE_DELAY_MS", defaults.settle_delay_ms),
            journal_delay_ms:  env_delay("SIM_JOURNAL_DELAY_MS", defaults.journal_delay_ms),
            volatility,
            seed:              std::env::var("SIM_SEED").ok().and_then(|v| v.parse().ok()),
            autostart:         std::env::var("SIM_AUTOSTART")
                .map(|v| v != "false" && v != "0").unwrap_or(defaults.autostart),
            event_buffer:      env_u64("SIM_EVENT_BUFFER", defaults.event_buffer as u64).max(1) as usize,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Like [`env_u64`], capped at [`MAX_DELAY_MS`].
fn env_delay(key: &str, default: u64) -> u64 {
    let ms = env_u64(key, default);
    if ms > MAX_DELAY_MS {
        warn!(key, ms, cap = MAX_DELAY_MS, "Delay too long — capped");
        return MAX_DELAY_MS;
    }
    ms
}
