//! # engine::random
//!
//! Injectable source for every random draw the simulator makes: price jitter,
//! volume increments and trade ids.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

pub trait RandomSource: Send {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// 16 bytes for a trade id.
    fn next_id_bytes(&mut self) -> [u8; 16];
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn next_id_bytes(&mut self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        self.fill_bytes(&mut bytes);
        bytes
    }
}

/// `StdRng` from `seed`, or from entropy when `None`.
pub fn std_source(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(StdRng::from_entropy()),
    }
}

/// Replays a fixed cycle of unit draws.  Ids come from a counter so they stay
/// distinct whatever the cycle holds.
///
/// `SequenceRandom::constant(0.5)` pins every price change to zero and every
/// volume increment to 5000.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
    next_id: u128,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        let values = if values.is_empty() { vec![0.5] } else { values };
        Self { values, cursor: 0, next_id: 1 }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }

    fn next_id_bytes(&mut self) -> [u8; 16] {
        let id = self.next_id;
        self.next_id += 1;
        id.to_be_bytes()
    }
}
