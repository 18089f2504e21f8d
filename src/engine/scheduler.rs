//! # engine::scheduler
//!
//! Time-keyed queue of deferred simulator actions (entry fill, settlement,
//! journal notice).  Actions fire in due-time order; ties fire in the order
//! they were scheduled.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::CompletedTrade;

#[derive(Debug, Clone, PartialEq)]
pub enum DeferredAction {
    /// Promote an `entering` trade to `active`.
    Fill { trade_id: Uuid },
    /// Move an exited trade into the journal and drop it from the active set.
    Settle { completed: Box<CompletedTrade> },
    /// Announce a settled trade to journal listeners.
    JournalNotice { completed: Box<CompletedTrade> },
}

#[derive(Debug)]
struct Entry {
    due: DateTime<Utc>,
    seq: u64,
    action: DeferredAction,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

#[derive(Debug, Default)]
pub struct DeferredQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: DateTime<Utc>, action: DeferredAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry { due, seq, action }));
    }

    /// Removes and returns the earliest action due at or before `now`,
    /// together with the time it was due.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DeferredAction)> {
        match self.heap.peek() {
            Some(Reverse(entry)) if entry.due <= now => {
                self.heap.pop().map(|Reverse(entry)| (entry.due, entry.action))
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
