//! # events
//!
//! Defines [`SimEvent`] — every event the simulator emits to its listeners.
//!
//! The monitor bridge serialises each event to a JSON `String` before pushing
//! it into the `tokio::sync::broadcast` channel, so WebSocket clients receive
//! the same payloads in-process listeners see.

use serde::Serialize;

use crate::models::{ActiveTrade, CompletedTrade, Quote};

/// Event names a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    PriceUpdated,
    TradeUpdated,
    TradeCompleted,
    TradeJournalUpdated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimEvent {
    /// One per symbol per tick.
    PriceUpdated {
        symbol: String,
        quote:  Quote,
    },

    /// A trade was created, filled, re-marked or hit its exit.  On exit the
    /// snapshot already has status `completed` and `lessons` is set.
    TradeUpdated {
        trade: Box<ActiveTrade>,
        #[serde(skip_serializing_if = "Option::is_none")]
        lessons: Option<String>,
    },

    /// Settled: appended to the journal and removed from the active set.
    TradeCompleted {
        trade: Box<CompletedTrade>,
    },

    /// Fired after the fade-out window, once the journal should show it.
    TradeJournalUpdated {
        trade: Box<CompletedTrade>,
    },
}

impl SimEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SimEvent::PriceUpdated { .. }        => EventKind::PriceUpdated,
            SimEvent::TradeUpdated { .. }        => EventKind::TradeUpdated,
            SimEvent::TradeCompleted { .. }      => EventKind::TradeCompleted,
            SimEvent::TradeJournalUpdated { .. } => EventKind::TradeJournalUpdated,
        }
    }

    /// JSON text frame for the monitor stream.
    #[inline]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"event":"SERIALIZATION_ERROR"}"#.to_string())
    }
}
