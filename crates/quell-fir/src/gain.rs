//! Single-frequency gain measurement and normalization of FIR taps.

use std::f64::consts::PI;

/// A coefficient type the gain routines can read and rescale.
///
/// Fixed-point taps are interpreted as Q15 (`value / 32768`).
pub trait Tap: Copy {
    /// Tap value as a real number.
    fn value(self) -> f64;
    /// Tap multiplied by `multiplier`, saturating for integer taps.
    fn scaled(self, multiplier: f64) -> Self;
}

impl Tap for f64 {
    fn value(self) -> f64 {
        self
    }

    fn scaled(self, multiplier: f64) -> Self {
        self * multiplier
    }
}

impl Tap for f32 {
    fn value(self) -> f64 {
        f64::from(self)
    }

    fn scaled(self, multiplier: f64) -> Self {
        (f64::from(self) * multiplier) as Self
    }
}

impl Tap for i16 {
    fn value(self) -> f64 {
        f64::from(self) / 32768.0
    }

    fn scaled(self, multiplier: f64) -> Self {
        (f64::from(self) * multiplier) as Self
    }
}

/// Magnitude of the response of `coeffs` at `freq_hz`.
///
/// Correlates the taps against cosine and sine references at the normalized
/// frequency and returns the length of the resulting complex sum.
pub fn filter_gain<T: Tap>(coeffs: &[T], freq_hz: f64, sample_rate_hz: f64) -> f64 {
    let f = freq_hz / sample_rate_hz;
    let (re, im) = coeffs
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(re, im), (i, &c)| {
            let phase = 2.0 * PI * f * i as f64;
            let c = c.value();
            (re + c * phase.cos(), im - c * phase.sin())
        });
    re.hypot(im)
}

/// Multiplies every tap by `multiplier`.
pub fn scale_coefficients<T: Tap>(coeffs: &mut [T], multiplier: f64) {
    for c in coeffs.iter_mut() {
        *c = c.scaled(multiplier);
    }
}

/// Multiplier that brings a response of `gain` to `headroom`.
///
/// The measured gain is floored at `1 / max_gain`, so the multiplier never
/// exceeds `headroom * max_gain`. A zero or non-finite gain is treated as the
/// floor.
pub fn unity_gain_multiplier(gain: f64, headroom: f64, max_gain: f64) -> f64 {
    let floor = 1.0 / max_gain;
    let gain = if gain.is_finite() && gain > floor { gain } else { floor };
    headroom / gain
}
