//! # engine::lesson
//!
//! Journal lesson attached to every completed trade.  Pure function of the
//! P/L sign and the exit reason.

use crate::models::{ActiveTrade, ExitReason};

pub fn lesson_for(profitable: bool, reason: Option<ExitReason>) -> &'static str {
    let at_target = matches!(reason, Some(ExitReason::TargetReached));

    match (profitable, at_target) {
        (true, true) => {
            "Patience and discipline paid off. The setup played out exactly as anticipated."
        }
        (true, false) => {
            "Quick to recognize strength and rode the momentum. Good trade management."
        }
        (false, false) => {
            "Protected capital by honoring stop loss. Market conditions changed - better opportunities ahead."
        }
        (false, true) => {
            "Market didn't follow through. Important to stay mechanical with exits."
        }
    }
}

/// Lesson for `trade` as marked at exit.  Zero P/L counts as not profitable.
pub fn generate_lesson(trade: &ActiveTrade) -> String {
    lesson_for(trade.is_profitable(), trade.exit_reason).to_string()
}
