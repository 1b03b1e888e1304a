//! Per-sample heuristic smoothers behind the FNR and FNRA modes.

use crate::config::BLOCK_SIZE;

pub const FNR_LEVELS: (u8, u8) = (1, 3);
pub const FNRA_LEVELS: (u8, u8) = (4, 6);

/// Longest moving-average window.
const MAX_AVERAGE_DEPTH: usize = 24;
/// Output scale of the moving average.
const AVERAGE_GAIN: f32 = 0.8;

/// Single-pole exponential smoother: `y += (x - y) * c`.
#[derive(Debug, Default)]
pub struct ExponentialSmoother {
    state: f32,
}

impl ExponentialSmoother {
    /// Smoothing coefficient for a level in `1..=3`; higher levels smooth
    /// harder.
    pub fn coefficient(level: u8) -> f32 {
        match level.clamp(FNR_LEVELS.0, FNR_LEVELS.1) {
            1 => 0.5,
            2 => 0.3,
            _ => 0.1,
        }
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    pub fn process(&mut self, block: &mut [f32; BLOCK_SIZE], level: u8) {
        let c = Self::coefficient(level);
        for sample in block.iter_mut() {
            self.state += (*sample - self.state) * c;
            *sample = self.state;
        }
    }
}

/// Moving average over the last 8, 16 or 24 samples, scaled by 0.8.
#[derive(Debug)]
pub struct MovingAverageSmoother {
    history: [f32; MAX_AVERAGE_DEPTH],
    pos: usize,
}

impl Default for MovingAverageSmoother {
    fn default() -> Self {
        Self {
            history: [0.0; MAX_AVERAGE_DEPTH],
            pos: 0,
        }
    }
}

impl MovingAverageSmoother {
    /// Window length for a level in `4..=6`.
    pub fn depth(level: u8) -> usize {
        match level.clamp(FNRA_LEVELS.0, FNRA_LEVELS.1) {
            4 => 8,
            5 => 16,
            _ => 24,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn process(&mut self, block: &mut [f32; BLOCK_SIZE], level: u8) {
        let depth = Self::depth(level);
        for sample in block.iter_mut() {
            self.history[self.pos] = *sample;
            let sum: f32 = (0..depth)
                .map(|k| self.history[(self.pos + MAX_AVERAGE_DEPTH - k) % MAX_AVERAGE_DEPTH])
                .sum();
            self.pos = (self.pos + 1) % MAX_AVERAGE_DEPTH;
            *sample = sum / depth as f32 * AVERAGE_GAIN;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_step_response() {
        let mut smoother = ExponentialSmoother::default();
        let mut block = [1.0; BLOCK_SIZE];
        smoother.process(&mut block, 1);
        assert_eq!(block[0], 0.5);
        assert_eq!(block[1], 0.75);
        assert!((block[BLOCK_SIZE - 1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn levels_are_clamped() {
        assert_eq!(ExponentialSmoother::coefficient(0), 0.5);
        assert_eq!(ExponentialSmoother::coefficient(9), 0.1);
        assert_eq!(MovingAverageSmoother::depth(0), 8);
        assert_eq!(MovingAverageSmoother::depth(5), 16);
        assert_eq!(MovingAverageSmoother::depth(200), 24);
    }

    #[test]
    fn moving_average_settles_to_scaled_dc() {
        let mut smoother = MovingAverageSmoother::default();
        let mut block = [1.0; BLOCK_SIZE];
        smoother.process(&mut block, 4);
        assert!((block[0] - 0.1).abs() < 1e-6);
        assert!((block[7] - 0.8).abs() < 1e-6);
        assert!((block[BLOCK_SIZE - 1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn reset_forgets_history() {
        let mut smoother = MovingAverageSmoother::default();
        let mut block = [1.0; BLOCK_SIZE];
        smoother.process(&mut block, 6);
        smoother.reset();
        let mut silent = [0.0; BLOCK_SIZE];
        smoother.process(&mut silent, 6);
        assert!(silent.iter().all(|&s| s == 0.0));
    }
}
