//! Domain models shared across the simulator and the monitor surface.

pub mod market;
pub mod recommendation;
pub mod trade;

pub use market::{Quote, VolatilityLevel};
pub use trade::{ActiveTrade, CompletedTrade, ExitReason, OptionType, TradeSetup, TradeStatus};
