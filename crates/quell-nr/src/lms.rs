//! Normalized LMS noise reduction.
//!
//! Each block is written into a two-block ring. The adaptive filter sees the
//! current block as its input and the previous block as its desired signal;
//! the one-block lag decorrelates broadband noise so the filter only locks
//! onto components that persist across blocks. The filter's error is written
//! back over the block.

use tracing::debug;

use crate::config::{BLOCK_SIZE, LMS_MAX_STRENGTH, LMS_MIN_STRENGTH, LMS_RING_LEN, LMS_TAPS};

/// Keeps the normalization finite while the input energy is zero.
const ENERGY_REGULARIZER: f32 = 1.192_092_9e-7;

/// Adaptation step for an integer strength: `1 / 10^((s/2 + 2) / 10)`.
///
/// Higher strength gives a smaller step. Strength is clamped to
/// [`LMS_MIN_STRENGTH`]`..=`[`LMS_MAX_STRENGTH`].
pub fn step_size(strength: i32) -> f32 {
    let strength = strength.clamp(LMS_MIN_STRENGTH, LMS_MAX_STRENGTH) as f32;
    1.0 / 10f32.powf((strength / 2.0 + 2.0) / 10.0)
}

/// Normalized LMS filter with its decorrelation ring.
#[derive(Debug)]
pub struct NormalizedLms {
    mu: f32,
    weights: [f32; LMS_TAPS],
    /// Last `LMS_TAPS` inputs; `history_pos` is the oldest.
    history: [f32; LMS_TAPS],
    history_pos: usize,
    energy: f32,
    ring: [f32; LMS_RING_LEN],
    write_cursor: usize,
}

impl NormalizedLms {
    pub fn new(strength: i32) -> Self {
        Self {
            mu: step_size(strength),
            weights: [0.0; LMS_TAPS],
            history: [0.0; LMS_TAPS],
            history_pos: 0,
            energy: 0.0,
            ring: [0.0; LMS_RING_LEN],
            write_cursor: 0,
        }
    }

    /// Clears taps, history and ring and adopts `strength`.
    pub fn reset(&mut self, strength: i32) {
        *self = Self::new(strength);
        debug!(strength, mu = self.mu, "normalized LMS reset");
    }

    pub fn step_size(&self) -> f32 {
        self.mu
    }

    pub fn weights(&self) -> &[f32; LMS_TAPS] {
        &self.weights
    }

    /// Ring offset of the block used as the desired signal; trails the write
    /// cursor by one block.
    fn read_cursor(&self) -> usize {
        (self.write_cursor + BLOCK_SIZE) % LMS_RING_LEN
    }

    pub fn process(&mut self, block: &mut [f32; BLOCK_SIZE]) {
        let write = self.write_cursor;
        let read = self.read_cursor();
        self.ring[write..write + BLOCK_SIZE].copy_from_slice(block);

        let Self {
            mu,
            weights,
            history,
            history_pos,
            energy,
            ring,
            ..
        } = self;
        let reference = &ring[read..read + BLOCK_SIZE];

        for (sample, &desired) in block.iter_mut().zip(reference) {
            let x = *sample;
            let oldest = history[*history_pos];
            *energy = (*energy - oldest * oldest + x * x).max(0.0);
            history[*history_pos] = x;
            *history_pos = (*history_pos + 1) % LMS_TAPS;

            let (newer, older) = history.split_at(*history_pos);
            let estimate: f32 = weights
                .iter()
                .zip(older.iter().chain(newer))
                .map(|(w, h)| w * h)
                .sum();
            let error = desired - estimate;

            let factor = *mu * error / (*energy + ENERGY_REGULARIZER);
            for (w, h) in weights.iter_mut().zip(older.iter().chain(newer)) {
                *w += factor * h;
            }
            *sample = error;
        }

        self.write_cursor = (write + BLOCK_SIZE) % LMS_RING_LEN;
    }
}
