//! # models::trade
//!
//! Structs for the trade lifecycle.
//!
//! `TradeSetup`     = the plan supplied by the caller (immutable)
//! `ActiveTrade`    = an executed setup the simulator marks to market every tick
//! `CompletedTrade` = an `ActiveTrade` frozen at exit, plus its lesson

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::market::round2;

/// Nominal capital behind every simulated position, used for display metrics.
pub const NOMINAL_PRINCIPAL: f64 = 1000.0;

// ─── OptionType ───────────────────────────────────────────────────────────────

/// Option class of a setup. Decides P/L sign and exit direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionType {
    Call,
    Put,
}

// ─── TradeSetup ───────────────────────────────────────────────────────────────

/// A trade idea as handed to `execute_trade`.
///
/// The simulator does not check that the levels make sense (a stop on the
/// wrong side of entry is accepted as-is); it only requires a tracked symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSetup {
    pub symbol: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub strike: f64,
    /// Expiry label, e.g. `"2024-05-17"`. Not interpreted.
    pub expiry: String,
    pub entry: f64,
    pub stop_loss: f64,
    pub target: f64,
    /// Estimated probability of reaching target, 0..1.
    pub probability: f64,
    /// Short label, e.g. `"Bullish Breakout"`.
    pub setup: String,
    pub analysis: String,
}

impl TradeSetup {
    /// Signed P/L of this setup at `price`, unrounded.
    #[inline]
    pub fn profit_loss_at(&self, price: f64) -> f64 {
        match self.option_type {
            OptionType::Call => price - self.entry,
            OptionType::Put  => self.entry - price,
        }
    }

    /// Exit condition at `price`. Stop-loss is checked before target.
    pub fn exit_signal(&self, price: f64) -> Option<ExitReason> {
        match self.option_type {
            OptionType::Call => {
                if price <= self.stop_loss {
                    Some(ExitReason::StopLossHit)
                } else if price >= self.target {
                    Some(ExitReason::TargetReached)
                } else {
                    None
                }
            }
            OptionType::Put => {
                if price >= self.stop_loss {
                    Some(ExitReason::StopLossHit)
                } else if price <= self.target {
                    Some(ExitReason::TargetReached)
                } else {
                    None
                }
            }
        }
    }
}

// ─── TradeStatus ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    /// Order sent, fill pending.
    Entering,
    /// Filled; exit conditions evaluated every tick.
    Active,
    /// Exit hit; waiting for settlement to move it into the journal.
    Exiting,
    /// Settled.
    Completed,
}

// ─── ExitReason ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    #[serde(rename = "Stop loss hit")]
    StopLossHit,
    #[serde(rename = "Target reached")]
    TargetReached,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::StopLossHit   => write!(f, "Stop loss hit"),
            ExitReason::TargetReached => write!(f, "Target reached"),
        }
    }
}

// ─── ActiveTrade ──────────────────────────────────────────────────────────────

/// An executed setup tracked by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveTrade {
    pub id: Uuid,
    #[serde(flatten)]
    pub setup: TradeSetup,
    pub entry_time: DateTime<Utc>,
    /// Mirrors the quote of `setup.symbol` as of the last update.
    pub current_price: f64,
    pub profit_loss: f64,
    pub profit_loss_percent: f64,
    pub status: TradeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_reason: Option<ExitReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<DateTime<Utc>>,
}

/// Display figures for a position sized at [`NOMINAL_PRINCIPAL`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionMetrics {
    pub principal: f64,
    pub total_value: f64,
    pub total_percent: f64,
}

impl ActiveTrade {
    /// New trade in `entering` status, marked at `price` with zero P/L.
    pub fn open(id: Uuid, setup: TradeSetup, price: f64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            setup,
            entry_time: now,
            current_price: price,
            profit_loss: 0.0,
            profit_loss_percent: 0.0,
            status: TradeStatus::Entering,
            exit_reason: None,
            exit_time: None,
        }
    }

    /// Re-marks the trade at `price`. Both P/L fields are rounded to cents.
    pub fn mark(&mut self, price: f64) {
        let pl = self.setup.profit_loss_at(price);
        self.current_price = price;
        self.profit_loss = round2(pl);
        self.profit_loss_percent = if self.setup.entry != 0.0 {
            round2(pl / self.setup.entry * 100.0)
        } else {
            0.0
        };
    }

    pub fn is_profitable(&self) -> bool {
        self.profit_loss > 0.0
    }

    pub fn metrics(&self) -> PositionMetrics {
        PositionMetrics {
            principal:     NOMINAL_PRINCIPAL,
            total_value:   round2(NOMINAL_PRINCIPAL + self.profit_loss),
            total_percent: round2(self.profit_loss_percent),
        }
    }
}

// ─── CompletedTrade ───────────────────────────────────────────────────────────

/// A trade frozen at exit. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTrade {
    #[serde(flatten)]
    pub trade: ActiveTrade,
    pub lessons: String,
}

impl CompletedTrade {
    /// Freezes `trade` with status `completed` at `exit_time`.
    pub fn settle(mut trade: ActiveTrade, exit_time: DateTime<Utc>, lessons: String) -> Self {
        trade.status = TradeStatus::Completed;
        trade.exit_time = Some(exit_time);
        Self { trade, lessons }
    }

    pub fn id(&self) -> Uuid {
        self.trade.id
    }

    pub fn exit_time(&self) -> DateTime<Utc> {
        self.trade.exit_time.unwrap_or(self.trade.entry_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(option_type: OptionType, entry: f64, stop_loss: f64, target: f64) -> TradeSetup {
        TradeSetup {
            symbol: "AAPL".into(),
            option_type,
            strike: 175.0,
            expiry: "2024-05-17".into(),
            entry,
            stop_loss,
            target,
            probability: 0.65,
            setup: "Bullish Breakout".into(),
            analysis: String::new(),
        }
    }

    #[test]
    fn test_call_exit_boundaries() {
        let s = setup(OptionType::Call, 175.50, 173.50, 180.00);
        assert_eq!(s.exit_signal(173.50), Some(ExitReason::StopLossHit));
        assert_eq!(s.exit_signal(180.00), Some(ExitReason::TargetReached));
        assert_eq!(s.exit_signal(176.00), None);
    }

    #[test]
    fn test_put_exit_boundaries() {
        let s = setup(OptionType::Put, 185.20, 187.20, 180.00);
        assert_eq!(s.exit_signal(187.20), Some(ExitReason::StopLossHit));
        assert_eq!(s.exit_signal(179.99), Some(ExitReason::TargetReached));
        assert_eq!(s.exit_signal(184.00), None);
    }

    #[test]
    fn test_stop_checked_before_target() {
        // Inverted levels make both conditions true at once.
        let call = setup(OptionType::Call, 100.0, 110.0, 90.0);
        assert_eq!(call.exit_signal(100.0), Some(ExitReason::StopLossHit));
        let put = setup(OptionType::Put, 100.0, 90.0, 110.0);
        assert_eq!(put.exit_signal(100.0), Some(ExitReason::StopLossHit));
    }

    #[test]
    fn test_mark_sign_follows_option_type() {
        let now = Utc::now();
        let mut call = ActiveTrade::open(Uuid::nil(), setup(OptionType::Call, 175.50, 173.50, 180.0), 175.50, now);
        call.mark(180.00);
        assert_eq!(call.profit_loss, 4.50);
        assert_eq!(call.profit_loss_percent, 2.56);

        let mut put = ActiveTrade::open(Uuid::nil(), setup(OptionType::Put, 185.20, 187.20, 180.0), 185.20, now);
        put.mark(186.20);
        assert_eq!(put.profit_loss, -1.0);
        assert!(!put.is_profitable());
    }

    #[test]
    fn test_metrics_on_nominal_principal() {
        let mut trade = ActiveTrade::open(Uuid::nil(), setup(OptionType::Call, 175.50, 173.50, 180.0), 175.50, Utc::now());
        trade.mark(177.00);
        let m = trade.metrics();
        assert_eq!(m.principal, 1000.0);
        assert_eq!(m.total_value, 1001.5);
        assert_eq!(m.total_percent, 0.85);
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(setup(OptionType::Put, 1.0, 2.0, 0.5)).unwrap();
        assert_eq!(json["type"], "PUT");
        assert_eq!(
            serde_json::to_value(ExitReason::TargetReached).unwrap(),
            "Target reached"
        );
        assert_eq!(serde_json::to_value(TradeStatus::Entering).unwrap(), "entering");
    }
}
