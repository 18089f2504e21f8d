//! # routes::market
//!
//! Quote snapshots.
//!
//! | Method | Path                  | Description                 |
//! |--------|-----------------------|-----------------------------|
//! | GET    | `/api/market`         | All tracked quotes          |
//! | GET    | `/api/market/:symbol` | One quote (404 when absent) |
//! | GET    | `/api/health`         | Liveness check              |

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{error::AppError, state::SharedState};

/// GET /api/market
pub async fn get_all_market_data(
    State(state): State<SharedState>,
) -> impl IntoResponse {
    let quotes = state.simulator.lock().await.all_market_data();
    Json(json!({
        "ok":     true,
        "count":  quotes.len(),
        "quotes": quotes,
    }))
}

/// GET /api/market/:symbol
pub async fn get_market_data(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quote = state.simulator.lock().await.market_data(&symbol);

    match quote {
        Some(quote) => Ok(Json(json!({ "ok": true, "quote": quote }))),
        None => Err(AppError::NotFound(format!("No market data available for {symbol}"))),
    }
}

/// GET /api/health
pub async fn health_check(
    State(state): State<SharedState>,
) -> impl IntoResponse {
    let running = state.simulator.lock().await.is_running();
    Json(json!({
        "ok":      true,
        "service": "tradesim",
        "running": running,
    }))
}
