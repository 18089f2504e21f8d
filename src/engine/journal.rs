//! # engine::journal
//!
//! Summary figures over the completed-trade journal, optionally limited to a
//! recent window of exit times.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::market::round2;
use crate::models::CompletedTrade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    All,
    /// Last 30 days.
    Month,
    /// Last 7 days.
    Week,
}

impl Timeframe {
    /// Earliest exit time included, `None` for everything.
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Timeframe::All   => None,
            Timeframe::Month => Some(now - Duration::days(30)),
            Timeframe::Week  => Some(now - Duration::days(7)),
        }
    }
}

impl FromStr for Timeframe {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all"   => Ok(Timeframe::All),
            "month" => Ok(Timeframe::Month),
            "week"  => Ok(Timeframe::Week),
            other   => Err(EngineError::UnknownTimeframe(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalStats {
    pub timeframe:      Timeframe,
    pub total_trades:   usize,
    pub winning_trades: usize,
    pub win_rate_pct:   f64,
    pub total_profit:   f64,
    pub avg_return_pct: f64,
}

pub fn journal_stats(
    trades:    &[CompletedTrade],
    timeframe: Timeframe,
    now:       DateTime<Utc>,
) -> JournalStats {
    let since = timeframe.since(now);
    let selected: Vec<&CompletedTrade> = trades
        .iter()
        .filter(|t| since.map_or(true, |s| t.exit_time() >= s))
        .collect();

    let total_trades   = selected.len();
    let winning_trades = selected.iter().filter(|t| t.trade.is_profitable()).count();
    let total_profit: f64 = selected.iter().map(|t| t.trade.profit_loss).sum();
    let total_return: f64 = selected.iter().map(|t| t.trade.profit_loss_percent).sum();

    let (win_rate_pct, avg_return_pct) = if total_trades > 0 {
        (
            winning_trades as f64 / total_trades as f64 * 100.0,
            total_return / total_trades as f64,
        )
    } else {
        (0.0, 0.0)
    };

    JournalStats {
        timeframe,
        total_trades,
        winning_trades,
        win_rate_pct:   round2(win_rate_pct),
        total_profit:   round2(total_profit),
        avg_return_pct: round2(avg_return_pct),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActiveTrade, OptionType, TradeSetup};
    use uuid::Uuid;

    fn completed(pl: f64, pl_pct: f64, exit_time: DateTime<Utc>) -> CompletedTrade {
        let setup = TradeSetup {
            symbol: "AAPL".into(),
            option_type: OptionType::Call,
            strike: 175.0,
            expiry: "2024-05-17".into(),
            entry: 175.5,
            stop_loss: 173.5,
            target: 180.0,
            probability: 0.65,
            setup: String::new(),
            analysis: String::new(),
        };
        let mut trade = ActiveTrade::open(Uuid::new_v4(), setup, 175.5, exit_time);
        trade.profit_loss = pl;
        trade.profit_loss_percent = pl_pct;
        CompletedTrade::settle(trade, exit_time, String::new())
    }

    #[test]
    fn test_empty_journal() {
        let stats = journal_stats(&[], Timeframe::All, Utc::now());
        assert_eq!(stats.total_trades, 0);
        assert_eq!(stats.win_rate_pct, 0.0);
        assert_eq!(stats.avg_return_pct, 0.0);
    }

    #[test]
    fn test_all_time_stats() {
        let now = Utc::now();
        let trades = vec![
            completed(4.5, 2.56, now),
            completed(-2.0, -1.14, now),
            completed(0.0, 0.0, now),
        ];
        let stats = journal_stats(&trades, Timeframe::All, now);
        assert_eq!(stats.total_trades, 3);
        assert_eq!(stats.winning_trades, 1);
        assert_eq!(stats.win_rate_pct, 33.33);
        assert_eq!(stats.total_profit, 2.5);
        assert_eq!(stats.avg_return_pct, 0.47);
    }

    #[test]
    fn test_week_window_drops_old_exits() {
        let now = Utc::now();
        let trades = vec![
            completed(4.5, 2.56, now - Duration::days(2)),
            completed(-2.0, -1.14, now - Duration::days(20)),
        ];
        assert_eq!(journal_stats(&trades, Timeframe::Week, now).total_trades, 1);
        assert_eq!(journal_stats(&trades, Timeframe::Month, now).total_trades, 2);
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!("WEEK".parse::<Timeframe>().unwrap(), Timeframe::Week);
        assert!("year".parse::<Timeframe>().is_err());
    }
}
