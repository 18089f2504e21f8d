//! HTTP and WebSocket surface over the simulator.

pub mod market;
pub mod monitor;
pub mod simulation;
pub mod trades;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::SharedState;

/// Full router with CORS and request tracing.
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Market ────────────────────────────────────────────────────────────
        .route("/api/health",                          get(market::health_check))
        .route("/api/market",                          get(market::get_all_market_data))
        .route("/api/market/:symbol",                  get(market::get_market_data))
        // ── Trades ────────────────────────────────────────────────────────────
        .route("/api/trades",                          post(trades::execute_trade))
        .route("/api/trades/active",                   get(trades::get_active_trades))
        .route("/api/trades/completed",                get(trades::get_completed_trades))
        .route("/api/recommendations",                 get(trades::get_recommendations))
        .route("/api/recommendations/:index/execute",  post(trades::execute_recommendation))
        .route("/api/journal/stats",                   get(trades::get_journal_stats))
        // ── Run Control ───────────────────────────────────────────────────────
        .route("/api/simulation/start",                post(simulation::start_simulation))
        .route("/api/simulation/stop",                 post(simulation::stop_simulation))
        .route("/api/simulation/volatility",           put(simulation::set_volatility))
        .route("/api/simulation/status",               get(simulation::get_status))
        // ── Monitor ───────────────────────────────────────────────────────────
        .route("/ws/monitor",                          get(monitor::ws_monitor))
        // ── Middleware ────────────────────────────────────────────────────────
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
