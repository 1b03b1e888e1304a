//! MMSE spectral estimator with speech-presence-driven noise tracking.
//!
//! The noise estimate is seeded by averaging the first
//! [`MMSE_WARMUP_FRAMES`] frames. Afterwards each bin's noise power follows
//! the observed power weighted by the probability that the bin holds noise;
//! when speech has been likely for a while the estimate is held almost still.
//! Gains come from a decision-directed a-priori SNR, and a final pass widens
//! a moving average across bins when most of the power is being removed, to
//! break up isolated residual peaks.

use crate::band::BinRange;
use crate::config::{DENOMINATOR_FLOOR, MMSE_WARMUP_FRAMES, NUM_BINS, SmoothingParams};
use crate::spectral::SpectralPhase;

/// Time constant of the noise power update.
const NOISE_SMOOTHING: f32 = 0.8;
/// Time constant of the smoothed speech presence probability.
const PRESENCE_SMOOTHING: f32 = 0.9;
/// Assumed a-priori SNR of speech: 20 dB.
const SPEECH_SNR: f32 = 100.0;
/// Prior probability of speech.
const SPEECH_PRIOR: f32 = 0.5;
/// Smoothed presence above which the noise estimate is held.
const PRESENCE_HOLD: f32 = 0.99;
/// Residual noise weight while held.
const NOISE_SAFETY: f32 = 0.01;
/// Scale of the warm-up average handed to the first noise estimate.
const INITIAL_NOISE_SCALE: f32 = 0.5;
/// Initial smoothed presence.
const INITIAL_PRESENCE: f32 = 0.5;
const SNR_POST_RANGE: (f32, f32) = (0.1, 1_000.0);
/// Gain approximation constant: `G = sqrt(c v + v²) / γ`.
const GAIN_APPROX: f32 = 0.7212;
/// Retained power ratio above which no cross-bin smoothing is applied.
const POWER_RATIO_THRESHOLD: f32 = 0.4;
/// Half-width scale of the cross-bin smoother.
const SMOOTHING_WIDTH: f32 = 4.0;

#[derive(Debug)]
pub struct MmseEstimator {
    phase: SpectralPhase,
    warmup_frames: usize,
    noise_sum: [f32; NUM_BINS],
    noise: [f32; NUM_BINS],
    presence: [f32; NUM_BINS],
    /// Decision-directed memory `γ_post · G²` of the previous frame.
    previous_snr: [f32; NUM_BINS],
    scratch: [f32; NUM_BINS],
}

impl Default for MmseEstimator {
    fn default() -> Self {
        Self {
            phase: SpectralPhase::Uninitialized,
            warmup_frames: 0,
            noise_sum: [0.0; NUM_BINS],
            noise: [0.0; NUM_BINS],
            presence: [INITIAL_PRESENCE; NUM_BINS],
            previous_snr: [1.0; NUM_BINS],
            scratch: [0.0; NUM_BINS],
        }
    }
}

impl MmseEstimator {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> SpectralPhase {
        self.phase
    }

    /// Current noise power estimate per bin.
    pub fn noise(&self) -> &[f32; NUM_BINS] {
        &self.noise
    }

    pub fn update(
        &mut self,
        power: &[f32; NUM_BINS],
        gains: &mut [f32; NUM_BINS],
        smoothing: &SmoothingParams,
        band: BinRange,
    ) {
        if self.phase != SpectralPhase::Steady {
            self.warm_up(power);
        }
        // The frame that completes the warm-up is already processed.
        if self.phase == SpectralPhase::Steady {
            self.track_noise(power);
            self.compute_gains(power, gains, smoothing.clamped().alpha, band);
            self.smooth_musical_noise(power, gains, band);
        }
    }

    fn warm_up(&mut self, power: &[f32; NUM_BINS]) {
        let weight = 1.0 / MMSE_WARMUP_FRAMES as f32;
        for ((sum, noise), &p) in self.noise_sum.iter_mut().zip(&mut self.noise).zip(power) {
            *sum += weight * p;
            *noise = INITIAL_NOISE_SCALE * *sum;
        }
        self.warmup_frames += 1;
        self.phase = if self.warmup_frames >= MMSE_WARMUP_FRAMES {
            SpectralPhase::Steady
        } else {
            SpectralPhase::Warming
        };
    }

    fn track_noise(&mut self, power: &[f32; NUM_BINS]) {
        let likelihood_scale = 1.0 / (1.0 + SPEECH_SNR) - 1.0;
        let prior_odds = (1.0 / SPEECH_PRIOR - 1.0) * (1.0 + SPEECH_SNR);

        for ((noise, presence), &p) in self.noise.iter_mut().zip(&mut self.presence).zip(power) {
            let ratio = p / (*noise + DENOMINATOR_FLOOR);
            let mut speech = 1.0 / (1.0 + prior_odds * (likelihood_scale * ratio).exp());
            *presence = PRESENCE_SMOOTHING * *presence + (1.0 - PRESENCE_SMOOTHING) * speech;
            speech = if *presence > PRESENCE_HOLD {
                1.0 - NOISE_SAFETY
            } else {
                speech.min(1.0)
            };
            let observed = (1.0 - speech) * p + speech * *noise;
            *noise = NOISE_SMOOTHING * *noise + (1.0 - NOISE_SMOOTHING) * observed;
        }
    }

    fn compute_gains(
        &mut self,
        power: &[f32; NUM_BINS],
        gains: &mut [f32; NUM_BINS],
        alpha: f32,
        band: BinRange,
    ) {
        for bin in band.bins() {
            let post = (power[bin] / (self.noise[bin] + DENOMINATOR_FLOOR))
                .clamp(SNR_POST_RANGE.0, SNR_POST_RANGE.1);
            let prio = (alpha * self.previous_snr[bin] + (1.0 - alpha) * (post - 1.0).max(0.0)).max(0.0);
            let v = prio * post / (1.0 + prio);
            let gain = (GAIN_APPROX * v + v * v).sqrt() / post;
            self.previous_snr[bin] = post * gain * gain;
            gains[bin] = gain;
        }
    }

    /// Moving average across the band, widened when little power survives.
    fn smooth_musical_noise(
        &mut self,
        power: &[f32; NUM_BINS],
        gains: &mut [f32; NUM_BINS],
        band: BinRange,
    ) {
        let (before, after) = band.bins().fold((0.0, 0.0), |(b, a), bin| {
            (b + power[bin], a + gains[bin] * gains[bin] * power[bin])
        });
        let ratio = if before > DENOMINATOR_FLOOR { after / before } else { 1.0 };
        let width = smoothing_width(ratio, band.len());
        if width <= 1 {
            return;
        }
        let half = width / 2;
        let (low, high) = (band.low(), band.high());

        for bin in band.bins() {
            let window = if bin < low + half {
                bin..(bin + width).min(high)
            } else if bin + half >= high {
                (bin + 1).saturating_sub(width).max(low)..bin + 1
            } else {
                bin - half..bin + half + 1
            };
            let count = window.len() as f32;
            self.scratch[bin] = gains[window].iter().sum::<f32>() / count;
        }
        gains[low..high].copy_from_slice(&self.scratch[low..high]);
    }
}

/// Odd smoothing width for a retained-power ratio, no wider than the band.
fn smoothing_width(ratio: f32, band_len: usize) -> usize {
    if ratio > POWER_RATIO_THRESHOLD {
        return 1;
    }
    let steps = (0.5 + SMOOTHING_WIDTH * (1.0 - ratio / POWER_RATIO_THRESHOLD)) as usize;
    let width = 1 + 2 * steps;
    let max = if band_len % 2 == 0 { band_len.saturating_sub(1) } else { band_len };
    width.min(max.max(1))
}
