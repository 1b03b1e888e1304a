//! Half-overlapped short-time Fourier framing.
//!
//! A block is processed as two half-frames. Each frame is the previous
//! half-frame followed by the current one, windowed and transformed. A gain
//! per retained bin is applied to the bin and its Hermitian mirror, the frame
//! is transformed back, and the first half of the result is overlap-added
//! with the second half of the previous frame. Output lags input by one
//! half-frame.

use std::array;
use std::f32::consts::PI;

use quell_fft::{Complex32, ComplexFft};

use crate::config::{BLOCK_SIZE, FFT_LEN, FFT_LEN_BY_2, NUM_BINS};

/// Analysis/synthesis window placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameWindow {
    /// Hann before the forward transform only.
    Hann,
    /// Root-Hann before the forward transform and after the inverse.
    SqrtHann,
}

impl FrameWindow {
    fn table(self) -> [f32; FFT_LEN] {
        array::from_fn(|i| {
            let hann = 0.5 * (1.0 - (2.0 * PI * i as f32 / (FFT_LEN - 1) as f32).cos());
            match self {
                Self::Hann => hann,
                Self::SqrtHann => hann.sqrt(),
            }
        })
    }

    fn windows_synthesis(self) -> bool {
        matches!(self, Self::SqrtHann)
    }
}

#[derive(Debug)]
pub struct FrameEngine {
    window: FrameWindow,
    coefficients: [f32; FFT_LEN],
    last_samples: [f32; FFT_LEN_BY_2],
    last_ifft: [f32; FFT_LEN_BY_2],
    spectrum: Vec<Complex32>,
    power: [f32; NUM_BINS],
    gains: [f32; NUM_BINS],
    fft: ComplexFft,
}

impl FrameEngine {
    pub fn new(window: FrameWindow) -> Self {
        Self {
            window,
            coefficients: window.table(),
            last_samples: [0.0; FFT_LEN_BY_2],
            last_ifft: [0.0; FFT_LEN_BY_2],
            spectrum: vec![Complex32::default(); FFT_LEN],
            power: [0.0; NUM_BINS],
            gains: [1.0; NUM_BINS],
            fft: ComplexFft::new(FFT_LEN),
        }
    }

    /// Clears the overlap buffers and restores unity gains.
    pub fn reset(&mut self) {
        self.last_samples = [0.0; FFT_LEN_BY_2];
        self.last_ifft = [0.0; FFT_LEN_BY_2];
        self.power = [0.0; NUM_BINS];
        self.gains = [1.0; NUM_BINS];
    }

    pub fn window(&self) -> FrameWindow {
        self.window
    }

    /// Gains applied to the most recent frame.
    pub fn gains(&self) -> &[f32; NUM_BINS] {
        &self.gains
    }

    /// Runs both half-frames of `block` through the transform.
    ///
    /// `update_gains` receives the power of each retained bin and the gain
    /// table, which persists across frames and starts at unity.
    pub fn process<F>(&mut self, block: &mut [f32; BLOCK_SIZE], mut update_gains: F)
    where
        F: FnMut(&[f32; NUM_BINS], &mut [f32; NUM_BINS]),
    {
        for half in block.chunks_exact_mut(FFT_LEN_BY_2) {
            let (older, newer) = self.spectrum.split_at_mut(FFT_LEN_BY_2);
            for (bin, &s) in older.iter_mut().zip(&self.last_samples) {
                *bin = Complex32::new(s, 0.0);
            }
            for (bin, &s) in newer.iter_mut().zip(half.iter()) {
                *bin = Complex32::new(s, 0.0);
            }
            self.last_samples.copy_from_slice(half);

            for (bin, &w) in self.spectrum.iter_mut().zip(&self.coefficients) {
                bin.re *= w;
            }
            self.fft.forward(&mut self.spectrum);

            for (p, bin) in self.power.iter_mut().zip(&self.spectrum) {
                *p = bin.norm_sqr();
            }
            update_gains(&self.power, &mut self.gains);
            apply_symmetric(&mut self.spectrum, &self.gains);

            self.fft.inverse(&mut self.spectrum);
            if self.window.windows_synthesis() {
                for (bin, &w) in self.spectrum.iter_mut().zip(&self.coefficients) {
                    bin.re *= w;
                }
            }

            let (first, second) = self.spectrum.split_at(FFT_LEN_BY_2);
            for ((out, bin), &last) in half.iter_mut().zip(first).zip(&self.last_ifft) {
                *out = bin.re + last;
            }
            for (last, bin) in self.last_ifft.iter_mut().zip(second) {
                *last = bin.re;
            }
        }
    }
}

/// Scales bin `k` and its mirror `N - k`; Nyquist takes the last gain.
fn apply_symmetric(spectrum: &mut [Complex32], gains: &[f32; NUM_BINS]) {
    spectrum[0] *= gains[0];
    for (k, &g) in gains.iter().enumerate().skip(1) {
        spectrum[k] *= g;
        spectrum[FFT_LEN - k] *= g;
    }
    spectrum[FFT_LEN_BY_2] *= gains[NUM_BINS - 1];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_block(offset: usize) -> [f32; BLOCK_SIZE] {
        array::from_fn(|n| 0.5 * (0.05 * (n + offset) as f32).sin())
    }

    fn check_delayed_reconstruction(window: FrameWindow) {
        let mut engine = FrameEngine::new(window);
        let mut input = Vec::new();
        let mut output = Vec::new();
        for round in 0..6 {
            let block = sine_block(round * BLOCK_SIZE);
            input.extend_from_slice(&block);
            let mut out = block;
            engine.process(&mut out, |_, _| {});
            output.extend_from_slice(&out);
        }
        for n in BLOCK_SIZE..output.len() {
            let expected = input[n - FFT_LEN_BY_2];
            assert!(
                (output[n] - expected).abs() < 0.01,
                "{window:?} sample {n}: {} vs {expected}",
                output[n]
            );
        }
    }

    #[test]
    fn unity_gains_reconstruct_delayed_input() {
        check_delayed_reconstruction(FrameWindow::Hann);
        check_delayed_reconstruction(FrameWindow::SqrtHann);
    }

    #[test]
    fn zero_gains_silence_output() {
        let mut engine = FrameEngine::new(FrameWindow::Hann);
        for round in 0..3 {
            let mut block = sine_block(round * BLOCK_SIZE);
            engine.process(&mut block, |_, gains| gains.fill(0.0));
            if round > 0 {
                assert!(block.iter().all(|s| s.abs() < 1e-6));
            }
        }
    }

    #[test]
    fn power_reaches_gain_callback() {
        let mut engine = FrameEngine::new(FrameWindow::Hann);
        let mut calls = 0;
        let mut peak_bin = 0;
        for round in 0..2 {
            let mut block: [f32; BLOCK_SIZE] = array::from_fn(|n| {
                let t = (n + round * BLOCK_SIZE) as f32;
                (2.0 * PI * 20.0 * t / FFT_LEN as f32).cos()
            });
            engine.process(&mut block, |power, _| {
                calls += 1;
                peak_bin = power
                    .iter()
                    .enumerate()
                    .fold((0, 0.0f32), |best, (k, &p)| if p > best.1 { (k, p) } else { best })
                    .0;
            });
        }
        assert_eq!(calls, 4);
        assert_eq!(peak_bin, 20);
    }

    #[test]
    fn reset_restores_unity_gains() {
        let mut engine = FrameEngine::new(FrameWindow::SqrtHann);
        let mut block = sine_block(0);
        engine.process(&mut block, |_, gains| gains.fill(0.3));
        assert!(engine.gains().iter().all(|&g| g == 0.3));
        engine.reset();
        assert!(engine.gains().iter().all(|&g| g == 1.0));
        assert_eq!(engine.window(), FrameWindow::SqrtHann);
    }
}
