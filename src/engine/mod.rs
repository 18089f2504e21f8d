//! Simulation engine: the market simulator and the pieces it is built from.

pub mod clock;
pub mod driver;
pub mod journal;
pub mod lesson;
pub mod listeners;
pub mod random;
pub mod scheduler;
pub mod simulator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::SharedSimulator;
pub use journal::{JournalStats, Timeframe};
pub use listeners::ListenerId;
pub use random::{RandomSource, SequenceRandom};
pub use simulator::MarketSimulator;
