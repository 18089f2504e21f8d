//! # routes::trades
//!
//! Trade execution, recommendations and the journal.
//!
//! | Method | Path                                     | Description                          |
//! |--------|------------------------------------------|--------------------------------------|
//! | POST   | `/api/trades`                            | Execute a `TradeSetup`               |
//! | GET    | `/api/trades/active`                     | Open trades                          |
//! | GET    | `/api/trades/completed`                  | Journal entries                      |
//! | GET    | `/api/recommendations`                   | Built-in setups                      |
//! | POST   | `/api/recommendations/:index/execute`    | Execute one built-in setup           |
//! | GET    | `/api/journal/stats?timeframe=week`      | Win rate, P/L and average return     |

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{
    engine::Timeframe,
    error::AppError,
    models::{recommendation::catalog, TradeSetup},
    state::SharedState,
};

// ─── POST /api/trades ─────────────────────────────────────────────────────────

pub async fn execute_trade(
    State(state): State<SharedState>,
    Json(setup): Json<TradeSetup>,
) -> Result<impl IntoResponse, AppError> {
    let trade = state.simulator.lock().await.execute_trade(setup)?;
    let metrics = trade.metrics();

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok":      true,
            "trade":   trade,
            "metrics": metrics,
        })),
    ))
}

// ─── GET /api/trades/active ───────────────────────────────────────────────────

pub async fn get_active_trades(
    State(state): State<SharedState>,
) -> impl IntoResponse {
    let trades = state.simulator.lock().await.active_trades();
    let metrics: Vec<_> = trades.iter().map(|t| t.metrics()).collect();

    Json(json!({
        "ok":      true,
        "count":   trades.len(),
        "trades":  trades,
        "metrics": metrics,
    }))
}

// ─── GET /api/trades/completed ────────────────────────────────────────────────

pub async fn get_completed_trades(
    State(state): State<SharedState>,
) -> impl IntoResponse {
    let trades = state.simulator.lock().await.completed_trades();
    Json(json!({
        "ok":     true,
        "count":  trades.len(),
        "trades": trades,
    }))
}

// ─── Recommendations ──────────────────────────────────────────────────────────

/// GET /api/recommendations
pub async fn get_recommendations() -> impl IntoResponse {
    let setups = catalog();
    Json(json!({
        "ok":     true,
        "count":  setups.len(),
        "setups": setups,
    }))
}

/// POST /api/recommendations/:index/execute
pub async fn execute_recommendation(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, AppError> {
    let setup = catalog()
        .into_iter()
        .nth(index)
        .ok_or_else(|| AppError::NotFound(format!("No recommendation at index {index}")))?;

    info!(index, symbol = %setup.symbol, "Executing recommended setup");
    let trade = state.simulator.lock().await.execute_trade(setup)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "trade": trade })),
    ))
}

// ─── GET /api/journal/stats ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StatsQuery {
    pub timeframe: Option<String>,
}

pub async fn get_journal_stats(
    State(state): State<SharedState>,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let timeframe: Timeframe = match query.timeframe {
        Some(raw) => raw.parse()?,
        None => Timeframe::All,
    };

    let stats = state.simulator.lock().await.journal_stats(timeframe);
    Ok(Json(json!({ "ok": true, "stats": stats })))
}
