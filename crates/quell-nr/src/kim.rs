//! Kim & Ruwisch spectral subtraction.
//!
//! Per bin, a short-term average of the power over the last
//! [`KIM_L_FRAMES`] frames is kept for [`KIM_N_FRAMES`] frames; the minimum
//! of those averages tracks the noise floor. When the current power stands
//! well above the floor (ratio above `ψ`) the floor is subtracted, otherwise
//! the short-term average is. Raw gains are smoothed over time and then
//! across neighbouring bins.

use crate::band::BinRange;
use crate::config::{
    DENOMINATOR_FLOOR, GainReference, KIM_L_FRAMES, KIM_N_FRAMES, KimParams, NUM_BINS,
    SmoothingParams,
};
use crate::spectral::SpectralPhase;

#[derive(Debug)]
pub struct KimEstimator {
    phase: SpectralPhase,
    /// Last `KIM_L_FRAMES` power frames.
    power_history: [[f32; NUM_BINS]; KIM_L_FRAMES],
    power_pos: usize,
    /// Last `KIM_N_FRAMES` short-term averages.
    averages: [[f32; NUM_BINS]; KIM_N_FRAMES],
    average_pos: usize,
    filled: usize,
    noise_floor: [f32; NUM_BINS],
    smoothed_gains: [f32; NUM_BINS],
}

impl Default for KimEstimator {
    fn default() -> Self {
        Self {
            phase: SpectralPhase::Uninitialized,
            power_history: [[0.0; NUM_BINS]; KIM_L_FRAMES],
            power_pos: 0,
            averages: [[0.0; NUM_BINS]; KIM_N_FRAMES],
            average_pos: 0,
            filled: 0,
            noise_floor: [0.0; NUM_BINS],
            smoothed_gains: [0.0; NUM_BINS],
        }
    }
}

impl KimEstimator {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> SpectralPhase {
        self.phase
    }

    /// Noise floor of every bin as of the last frame.
    pub fn noise_floor(&self) -> &[f32; NUM_BINS] {
        &self.noise_floor
    }

    pub fn update(
        &mut self,
        power: &[f32; NUM_BINS],
        gains: &mut [f32; NUM_BINS],
        kim: &KimParams,
        smoothing: &SmoothingParams,
        band: BinRange,
    ) {
        let kim = kim.clamped();
        let smoothing = smoothing.clamped();

        self.power_history[self.power_pos] = *power;
        for bin in band.bins() {
            let sum: f32 = self.power_history.iter().map(|frame| frame[bin]).sum();
            self.averages[self.average_pos][bin] = sum / KIM_L_FRAMES as f32;
        }
        self.filled = (self.filled + 1).min(KIM_N_FRAMES);
        self.phase = if self.filled < KIM_N_FRAMES {
            SpectralPhase::Warming
        } else {
            SpectralPhase::Steady
        };
        self.update_noise_floor(band);

        let alpha = smoothing.alpha;
        for bin in band.bins() {
            let current = power[bin];
            let average = self.averages[self.average_pos][bin];
            let floor = self.noise_floor[bin];
            let ratio = current / (floor + DENOMINATOR_FLOOR);
            let lambda = if ratio > kim.psi { floor } else { average };
            let reference = match kim.reference {
                GainReference::CurrentPower => current,
                GainReference::ShortTermAverage => average,
            };
            let raw = (1.0 - lambda * kim.strength / (reference + DENOMINATOR_FLOOR)).max(0.0);
            let smoothed = &mut self.smoothed_gains[bin];
            *smoothed = alpha * *smoothed + (1.0 - alpha) * raw;
        }

        smooth_across_bins(&self.smoothed_gains, gains, &smoothing, band);

        self.power_pos = (self.power_pos + 1) % KIM_L_FRAMES;
        self.average_pos = (self.average_pos + 1) % KIM_N_FRAMES;
    }

    /// Minimum over the filled history slots of each in-band bin.
    fn update_noise_floor(&mut self, band: BinRange) {
        let filled = &self.averages[..self.filled];
        for bin in band.bins() {
            self.noise_floor[bin] = filled
                .iter()
                .map(|frame| frame[bin])
                .fold(f32::INFINITY, f32::min);
        }
    }
}

/// Three-tap smoothing `β, 1-2β, β` inside the band, one-sided at its edges.
/// Bins outside the band are left at unity.
fn smooth_across_bins(
    smoothed: &[f32; NUM_BINS],
    gains: &mut [f32; NUM_BINS],
    smoothing: &SmoothingParams,
    band: BinRange,
) {
    let beta = smoothing.beta;
    let center = smoothing.one_minus_two_beta();
    let (low, high) = (band.low(), band.high());

    for (bin, gain) in gains.iter_mut().enumerate() {
        if !band.contains(bin) {
            *gain = 1.0;
            continue;
        }
        let g = if band.len() == 1 {
            smoothed[bin]
        } else if bin == low {
            (center + beta) * smoothed[bin] + beta * smoothed[bin + 1]
        } else if bin == high - 1 {
            beta * smoothed[bin - 1] + (center + beta) * smoothed[bin]
        } else {
            beta * smoothed[bin - 1] + center * smoothed[bin] + beta * smoothed[bin + 1]
        };
        *gain = g.clamp(0.0, 1.0);
    }
}
