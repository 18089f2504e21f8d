//! # routes::simulation
//!
//! Run control for the simulator.
//!
//! | Method | Path                         | Description                        |
//! |--------|------------------------------|------------------------------------|
//! | POST   | `/api/simulation/start`      | Start ticking (no-op if running)   |
//! | POST   | `/api/simulation/stop`       | Stop ticking (no-op if stopped)    |
//! | PUT    | `/api/simulation/volatility` | `{ "level": "low|medium|high" }`   |
//! | GET    | `/api/simulation/status`     | Running flag, volatility, counters |

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, models::VolatilityLevel, state::SharedState};

/// POST /api/simulation/start
pub async fn start_simulation(
    State(state): State<SharedState>,
) -> impl IntoResponse {
    state.simulator.lock().await.start();
    Json(json!({ "ok": true, "running": true }))
}

/// POST /api/simulation/stop
pub async fn stop_simulation(
    State(state): State<SharedState>,
) -> impl IntoResponse {
    let pending = {
        let mut sim = state.simulator.lock().await;
        sim.stop();
        sim.pending_actions()
    };

    Json(json!({
        "ok":              true,
        "running":         false,
        "pending_actions": pending,
    }))
}

#[derive(Deserialize)]
pub struct VolatilityBody {
    pub level: String,
}

/// PUT /api/simulation/volatility
pub async fn set_volatility(
    State(state): State<SharedState>,
    Json(body): Json<VolatilityBody>,
) -> Result<impl IntoResponse, AppError> {
    let level: VolatilityLevel = body.level.parse()?;
    state.simulator.lock().await.set_volatility(level);

    Ok(Json(json!({
        "ok":          true,
        "volatility":  level,
        "coefficient": level.coefficient(),
    })))
}

/// GET /api/simulation/status
pub async fn get_status(
    State(state): State<SharedState>,
) -> impl IntoResponse {
    let sim = state.simulator.lock().await;
    Json(json!({
        "ok":              true,
        "running":         sim.is_running(),
        "volatility":      sim.volatility(),
        "tick_count":      sim.tick_count(),
        "symbols":         sim.all_market_data().len(),
        "active_trades":   sim.active_trades().len(),
        "completed_trades": sim.completed_trades().len(),
        "pending_actions": sim.pending_actions(),
        "tick_interval_ms": state.config.tick_interval_ms,
    }))
}
