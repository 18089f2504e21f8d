//! # models::recommendation
//!
//! Built-in catalog of recommended setups offered to the operator.

use crate::models::trade::{OptionType, TradeSetup};

#[allow(clippy::too_many_arguments)]
fn setup(
    symbol: &str,
    option_type: OptionType,
    strike: f64,
    entry: f64,
    stop_loss: f64,
    target: f64,
    probability: f64,
    label: &str,
    analysis: &str,
) -> TradeSetup {
    TradeSetup {
        symbol: symbol.to_string(),
        option_type,
        strike,
        expiry: "2024-05-17".to_string(),
        entry,
        stop_loss,
        target,
        probability,
        setup: label.to_string(),
        analysis: analysis.to_string(),
    }
}

/// Today's recommendations, in display order.
pub fn catalog() -> Vec<TradeSetup> {
    vec![
        setup(
            "AAPL", OptionType::Call, 175.0, 175.50, 173.50, 180.00, 0.65,
            "Bullish Breakout",
            "Strong support at 173.50, momentum indicators turning positive",
        ),
        setup(
            "TSLA", OptionType::Put, 185.0, 185.20, 187.20, 180.00, 0.70,
            "Bearish Reversal",
            "Resistance at 187, overbought conditions on RSI",
        ),
        setup(
            "NVDA", OptionType::Call, 880.0, 880.30, 875.00, 890.00, 0.75,
            "Momentum Continuation",
            "Strong uptrend with increasing volume",
        ),
    ]
}
