//! # state
//!
//! AppState — the simulator handle, the monitor broadcast channel and the
//! config, shared by every Axum handler.

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::SimConfig;
use crate::engine::driver::{bridge_to_broadcast, share, SharedSimulator};
use crate::engine::MarketSimulator;

// ─── AppState ─────────────────────────────────────────────────────────────────

/// Top-level shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// The one simulator instance.  Handlers lock it briefly and never hold
    /// the guard across an `.await`.
    pub simulator: SharedSimulator,

    /// Pre-serialised `SimEvent` JSON for WebSocket clients.
    pub broadcast_tx: broadcast::Sender<String>,

    pub config: Arc<SimConfig>,
}

impl AppState {
    /// Wires `simulator` to a fresh broadcast channel.
    pub fn new(mut simulator: MarketSimulator, config: SimConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.event_buffer);
        bridge_to_broadcast(&mut simulator, broadcast_tx.clone());

        Self {
            simulator: share(simulator),
            broadcast_tx,
            config: Arc::new(config),
        }
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

/// Builds the simulator from `config`, starting it when `autostart` is set.
pub fn build_state(config: SimConfig) -> SharedState {
    let mut simulator = MarketSimulator::from_config(&config);
    if config.autostart {
        simulator.start();
    }
    Arc::new(AppState::new(simulator, config))
}
