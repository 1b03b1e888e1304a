//! Variable-leak LMS predictor ("ANR").
//!
//! Predicts each sample from a delayed window of its own history. The
//! prediction captures periodic content, so the predictor serves two roles:
//! as a noise reducer it outputs the prediction, as an automatic notch it
//! outputs the prediction error. The tap leakage adapts per sample by
//! comparing the error with and without leakage.

use crate::config::{
    ANR_DEN_MULT, ANR_DLINE_SIZE, ANR_INITIAL_LIDX, ANR_INITIAL_NGAMMA, ANR_MASK, AnrParams,
    BLOCK_SIZE,
};

const SIGMA_FLOOR: f32 = 1e-10;

/// Which signal the predictor writes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnrOutput {
    /// The prediction error: removes periodic content such as carriers.
    Notch,
    /// The prediction: keeps periodic content and drops noise.
    NoiseReduction,
}

#[derive(Debug)]
pub struct VariableLeakLms {
    output: AnrOutput,
    delay_line: [f32; ANR_DLINE_SIZE],
    weights: [f32; ANR_DLINE_SIZE],
    in_idx: usize,
    lidx: f32,
    ngamma: f32,
}

impl VariableLeakLms {
    pub fn new(output: AnrOutput) -> Self {
        Self {
            output,
            delay_line: [0.0; ANR_DLINE_SIZE],
            weights: [0.0; ANR_DLINE_SIZE],
            in_idx: 0,
            lidx: ANR_INITIAL_LIDX,
            ngamma: ANR_INITIAL_NGAMMA,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.output);
    }

    pub fn output(&self) -> AnrOutput {
        self.output
    }

    /// Current leakage index.
    pub fn leakage_index(&self) -> f32 {
        self.lidx
    }

    pub fn process(&mut self, block: &mut [f32; BLOCK_SIZE], params: &AnrParams) {
        let params = params.clamped();
        let AnrParams {
            taps,
            delay,
            two_mu,
            lidx_min,
            lidx_max,
            ..
        } = params;

        for sample in block.iter_mut() {
            let i = self.in_idx;
            self.delay_line[i] = *sample;

            let mut prediction = 0.0;
            let mut sigma = 0.0;
            for (j, w) in self.weights[..taps].iter().enumerate() {
                let d = self.delay_line[(i + j + delay) & ANR_MASK];
                prediction += w * d;
                sigma += d * d;
            }
            let inv_sigp = 1.0 / (sigma + SIGMA_FLOOR);
            let current = self.delay_line[i];
            let error = current - prediction;

            *sample = match self.output {
                AnrOutput::Notch => error,
                AnrOutput::NoiseReduction => prediction,
            };

            let nel = (error * (1.0 - two_mu * sigma * inv_sigp)).abs();
            let nev = (current
                - (1.0 - two_mu * self.ngamma) * prediction
                - two_mu * error * sigma * inv_sigp)
                .abs();
            self.lidx = if nev < nel {
                (self.lidx + params.lidx_increment).min(lidx_max)
            } else {
                (self.lidx - params.lidx_decrement).max(lidx_min)
            };
            // Bounds may have moved since the last sample.
            self.lidx = self.lidx.clamp(lidx_min, lidx_max);
            self.ngamma = params.gamma * self.lidx.powi(4) * ANR_DEN_MULT;

            let c0 = 1.0 - two_mu * self.ngamma;
            let c1 = two_mu * error * inv_sigp;
            for (j, w) in self.weights[..taps].iter_mut().enumerate() {
                let d = self.delay_line[(i + j + delay) & ANR_MASK];
                *w = c0 * *w + c1 * d;
            }

            self.in_idx = (i + ANR_MASK) & ANR_MASK;
        }
    }
}
