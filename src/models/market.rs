//! # models::market
//!
//! Defines [`Quote`], the per-symbol price snapshot the simulator advances on
//! every tick, plus the fixed seed list and the [`VolatilityLevel`] presets.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Symbols tracked from construction, with their starting prices.
pub const SEED_QUOTES: &[(&str, f64)] = &[
    ("AAPL", 175.50),
    ("TSLA", 185.20),
    ("NVDA", 880.30),
    ("META", 505.40),
    ("MSFT", 425.60),
];

/// Lowest price a quote may reach after a tick.
pub const PRICE_FLOOR: f64 = 0.01;

/// Rounds to cents, the precision every quote and P/L field is kept at.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ─── Quote ────────────────────────────────────────────────────────────────────

/// Live price snapshot for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub current_price: f64,
    /// Price before the most recent update.
    pub last_price: f64,
    /// Cumulative synthetic volume.
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    pub fn new(symbol: &str, price: f64, volume: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.to_string(),
            current_price: price,
            last_price: price,
            volume,
            timestamp,
        }
    }

    /// Moves the current price into `last_price` and installs `price`.
    pub fn reprice(&mut self, price: f64, timestamp: DateTime<Utc>) {
        self.last_price = self.current_price;
        self.current_price = price;
        self.timestamp = timestamp;
    }
}

// ─── VolatilityLevel ──────────────────────────────────────────────────────────

/// Named jitter presets. The coefficient bounds the per-tick fractional move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl VolatilityLevel {
    pub fn coefficient(self) -> f64 {
        match self {
            VolatilityLevel::Low    => 0.001,
            VolatilityLevel::Medium => 0.002,
            VolatilityLevel::High   => 0.004,
        }
    }
}

impl fmt::Display for VolatilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolatilityLevel::Low    => write!(f, "low"),
            VolatilityLevel::Medium => write!(f, "medium"),
            VolatilityLevel::High   => write!(f, "high"),
        }
    }
}

impl FromStr for VolatilityLevel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low"    => Ok(VolatilityLevel::Low),
            "medium" => Ok(VolatilityLevel::Medium),
            "high"   => Ok(VolatilityLevel::High),
            other    => Err(EngineError::UnknownVolatility(other.to_string())),
        }
    }
}
