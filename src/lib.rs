//! # tradesim — in-memory options trade simulator
//!
//! ```text
//!  ┌──────────────┐  pump() every frame   ┌───────────────────────────────┐
//!  │ driver task  │ ────────────────────▶ │ MarketSimulator               │
//!  └──────────────┘                       │ ├─ quotes      (per symbol)   │
//!                                         │ ├─ active      (id → trade)   │
//!  ┌──────────────┐  execute / read       │ ├─ completed   (journal)      │
//!  │ REST routes  │ ────────────────────▶ │ ├─ deferred    (fill/settle)  │
//!  └──────────────┘                       │ └─ listeners ───────────────┐ │
//!                                         └─────────────────────────────┼─┘
//!  ┌──────────────┐  ws://host/ws/monitor  ◀─── broadcast channel ◀────┘
//!  │  Dashboard   │
//!  └──────────────┘
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod routes;
pub mod state;
