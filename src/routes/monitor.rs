//! # routes::monitor
//!
//! **Monitor feed** — live event stream for dashboards
//!
//! `GET /ws/monitor` upgrades to a WebSocket, sends a `SNAPSHOT` frame with
//! the current quotes and trades, then forwards every `SimEvent` as a JSON
//! text frame.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tracing::{debug, info};

use crate::state::SharedState;

/// Upgrade HTTP → WebSocket, then stream simulator events.
pub async fn ws_monitor(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    // Subscribe before taking the snapshot so no event falls in between.
    let mut rx = state.broadcast_tx.subscribe();
    let (mut sender, mut receiver) = socket.split();

    info!("🔌 WebSocket client connected");

    // ── Snapshot ──────────────────────────────────────────────────────────────
    let snapshot = {
        let sim = state.simulator.lock().await;
        json!({
            "event":      "SNAPSHOT",
            "running":    sim.is_running(),
            "volatility": sim.volatility(),
            "quotes":     sim.all_market_data(),
            "active":     sim.active_trades(),
            "completed":  sim.completed_trades(),
        })
        .to_string()
    };

    if sender.send(Message::Text(snapshot)).await.is_err() {
        return; // Client closed before the snapshot went out
    }

    // ── Event Loop ────────────────────────────────────────────────────────────
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(json_str) => {
                        if sender.send(Message::Text(json_str)).await.is_err() {
                            break; // Client disconnect
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!("WS client lagged, skipped {n} events");
                    }
                    Err(_) => break, // Channel closed
                }
            }

            result = receiver.next() => {
                match result {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    _ => {} // Client text/binary frames are ignored
                }
            }
        }
    }

    info!("🔌 WebSocket client disconnected");
}
