//! # engine::driver
//!
//! Runs the simulator on the tokio runtime.
//!
//! A single task pumps the engine every frame.  Frames are much shorter than
//! a tick, so the tick gate inside [`MarketSimulator::tick`] decides when state
//! actually moves, and deferred actions fire within one frame of being due.
//! All access goes through one `Mutex`, which keeps the simulator
//! single-writer no matter how many handlers touch it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::engine::listeners::ListenerId;
use crate::engine::simulator::MarketSimulator;

pub type SharedSimulator = Arc<Mutex<MarketSimulator>>;

pub fn share(sim: MarketSimulator) -> SharedSimulator {
    Arc::new(Mutex::new(sim))
}

/// Forwards every simulator event into `tx` as a JSON string.
///
/// A send error only means nobody is listening right now, so it is not
/// reported as a listener failure.
pub fn bridge_to_broadcast(sim: &mut MarketSimulator, tx: broadcast::Sender<String>) -> ListenerId {
    sim.subscribe_all(move |event| {
        let _ = tx.send(event.to_json());
        Ok(())
    })
}

/// Spawns the frame loop.  Abort the returned handle to stop driving.
pub fn spawn_driver(sim: SharedSimulator, frame: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut frames = tokio::time::interval(frame);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(frame_ms = frame.as_millis() as u64, "⏱️ Simulation driver running");

        loop {
            frames.tick().await;
            sim.lock().await.pump();
        }
    })
}
