#![doc = include_str!("../README.md")]

use std::sync::Arc;

pub use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

/// In-place complex FFT of a fixed length.
#[derive(derive_more::Debug)]
pub struct ComplexFft {
    len: usize,
    inverse_scale: f32,
    #[debug(skip)]
    forward: Arc<dyn Fft<f32>>,
    #[debug(skip)]
    inverse: Arc<dyn Fft<f32>>,
    #[debug(skip)]
    scratch: Vec<Complex32>,
}

impl ComplexFft {
    /// Plans forward and inverse transforms of `len` points.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero.
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "FFT length must be non-zero");
        let mut planner = FftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Self {
            len,
            inverse_scale: 1.0 / len as f32,
            forward,
            inverse,
            scratch: vec![Complex32::default(); scratch_len],
        }
    }

    /// Transform length in points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a zero-length transform cannot be planned.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forward transform in place. `buffer` must hold exactly `len` points.
    pub fn forward(&mut self, buffer: &mut [Complex32]) {
        debug_assert_eq!(buffer.len(), self.len);
        self.forward.process_with_scratch(buffer, &mut self.scratch);
    }

    /// Inverse transform in place, scaled by `1/len`.
    pub fn inverse(&mut self, buffer: &mut [Complex32]) {
        debug_assert_eq!(buffer.len(), self.len);
        self.inverse.process_with_scratch(buffer, &mut self.scratch);
        for bin in buffer.iter_mut() {
            *bin *= self.inverse_scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use proptest::collection::vec;
    use test_strategy::proptest;

    use super::*;

    #[test]
    fn impulse_has_flat_spectrum() {
        let mut fft = ComplexFft::new(16);
        let mut buf = vec![Complex32::default(); 16];
        buf[0] = Complex32::new(1.0, 0.0);
        fft.forward(&mut buf);
        for (k, bin) in buf.iter().enumerate() {
            assert!(
                (bin.re - 1.0).abs() < 1e-6 && bin.im.abs() < 1e-6,
                "bin {k}: {bin}"
            );
        }
    }

    #[test]
    fn cosine_lands_in_its_bin_and_mirror() {
        let n = 256;
        let mut fft = ComplexFft::new(n);
        let mut buf: Vec<Complex32> = (0..n)
            .map(|i| {
                let phase = 2.0 * PI * 8.0 * i as f32 / n as f32;
                Complex32::new(phase.cos(), 0.0)
            })
            .collect();
        fft.forward(&mut buf);
        assert!((buf[8].re - n as f32 / 2.0).abs() < 1e-2, "{}", buf[8]);
        assert!((buf[n - 8].re - n as f32 / 2.0).abs() < 1e-2, "{}", buf[n - 8]);
        assert!(buf[9].norm() < 1e-2);
    }

    #[proptest]
    fn inverse_undoes_forward(
        #[strategy(vec(-1.0f32..1.0, 128))] samples: Vec<f32>,
    ) {
        let mut fft = ComplexFft::new(128);
        let mut buf: Vec<Complex32> = samples.iter().map(|&s| Complex32::new(s, 0.0)).collect();
        fft.forward(&mut buf);
        fft.inverse(&mut buf);
        for (out, &inp) in buf.iter().zip(&samples) {
            proptest::prop_assert!((out.re - inp).abs() < 1e-4);
            proptest::prop_assert!(out.im.abs() < 1e-4);
        }
    }
}
