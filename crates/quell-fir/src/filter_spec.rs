//! Filter requests in Hz and their translation to normalized designs.

use tracing::debug;

use crate::windowed_sinc::{self, FilterFamily};
use crate::Window;

/// Lowest normalized cutoff handed to the designer.
pub const MIN_NORMALIZED_CUTOFF: f64 = 1e-4;
/// Highest normalized cutoff handed to the designer.
pub const MAX_NORMALIZED_CUTOFF: f64 = 0.5 - MIN_NORMALIZED_CUTOFF;

/// A windowed-sinc filter request: tap count, family, window and passband
/// edges in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub family: FilterFamily,
    pub window: Window,
    pub taps: usize,
    pub low_hz: f64,
    pub high_hz: f64,
}

impl FilterSpec {
    /// Whether the edges describe a usable response. Edges must be finite
    /// and non-negative; band families need `low < high`.
    pub fn is_valid(&self) -> bool {
        let finite = [self.low_hz, self.high_hz]
            .iter()
            .all(|hz| hz.is_finite() && *hz >= 0.0);
        let ordered = match self.family {
            FilterFamily::Bandpass | FilterFamily::Bandstop => self.low_hz < self.high_hz,
            FilterFamily::Lowpass | FilterFamily::Highpass => true,
        };
        finite && ordered && self.taps > 0
    }

    /// Tap count actually designed; families built by spectral inversion are
    /// rounded up to odd.
    pub fn designed_taps(&self) -> usize {
        let taps = self.taps.max(1);
        if self.family.needs_center_tap() {
            taps | 1
        } else {
            taps
        }
    }

    /// Frequency at which the passband gain is measured: DC for lowpass and
    /// bandstop, Nyquist for highpass, the band centre for bandpass.
    pub fn reference_frequency_hz(&self, sample_rate_hz: f64) -> f64 {
        match self.family {
            FilterFamily::Lowpass | FilterFamily::Bandstop => 0.0,
            FilterFamily::Highpass => sample_rate_hz / 2.0,
            FilterFamily::Bandpass => (self.low_hz + self.high_hz) / 2.0,
        }
    }

    /// Designs `f64` taps at `sample_rate_hz`, clamping both edges into the
    /// open normalized range the designer accepts.
    pub fn design(&self, sample_rate_hz: f64) -> Vec<f64> {
        let low = normalized(self.low_hz, sample_rate_hz);
        let high = normalized(self.high_hz, sample_rate_hz);
        let taps = self.designed_taps();
        debug!(
            family = ?self.family,
            window = ?self.window,
            taps,
            low,
            high,
            "designing windowed-sinc filter"
        );
        windowed_sinc::design(self.family, taps, self.window, low, high)
    }

    /// Designs and quantizes to 16-bit taps.
    pub fn design_q15(&self, sample_rate_hz: f64) -> Vec<i16> {
        windowed_sinc::quantize(&self.design(sample_rate_hz))
    }
}

/// `hz / sample_rate_hz` clamped into the designer's range; NaN maps to the
/// lowest cutoff.
fn normalized(hz: f64, sample_rate_hz: f64) -> f64 {
    let cutoff = hz / sample_rate_hz;
    if cutoff.is_nan() {
        MIN_NORMALIZED_CUTOFF
    } else {
        cutoff.clamp(MIN_NORMALIZED_CUTOFF, MAX_NORMALIZED_CUTOFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gain::filter_gain;

    fn cw() -> FilterSpec {
        FilterSpec {
            family: FilterFamily::Bandpass,
            window: Window::Hamming,
            taps: 200,
            low_hz: 450.0,
            high_hz: 950.0,
        }
    }

    #[test]
    fn band_families_round_up_to_odd() {
        assert_eq!(cw().designed_taps(), 201);
        let lp = FilterSpec {
            family: FilterFamily::Lowpass,
            ..cw()
        };
        assert_eq!(lp.designed_taps(), 200);
        assert_eq!(cw().design(44_100.0).len(), 201);
    }

    #[test]
    fn out_of_range_edges_are_clamped() {
        let spec = FilterSpec {
            low_hz: 0.0,
            high_hz: 1e6,
            family: FilterFamily::Bandstop,
            ..cw()
        };
        let taps = spec.design(44_100.0);
        assert!(taps.iter().all(|t| t.is_finite()));
    }

    #[test]
    fn nan_edges_design_finite_taps() {
        for (low_hz, high_hz) in [(f64::NAN, 950.0), (450.0, f64::NAN), (f64::NAN, f64::NAN)] {
            let spec = FilterSpec {
                low_hz,
                high_hz,
                ..cw()
            };
            let taps = spec.design(44_100.0);
            assert_eq!(taps.len(), 201);
            assert!(taps.iter().all(|t| t.is_finite()), "{low_hz} {high_hz}");
        }
        assert_eq!(normalized(f64::NAN, 44_100.0), MIN_NORMALIZED_CUTOFF);
        assert_eq!(normalized(100.0, 0.0), MAX_NORMALIZED_CUTOFF);
    }

    #[test]
    fn validity() {
        assert!(cw().is_valid());
        let inverted = FilterSpec {
            low_hz: 950.0,
            high_hz: 450.0,
            ..cw()
        };
        assert!(!inverted.is_valid());
        let nan = FilterSpec {
            low_hz: f64::NAN,
            ..cw()
        };
        assert!(!nan.is_valid());
        let negative = FilterSpec {
            low_hz: -10.0,
            ..cw()
        };
        assert!(!negative.is_valid());
    }

    #[test]
    fn reference_frequency_sits_in_passband() {
        let spec = FilterSpec {
            low_hz: 300.0,
            high_hz: 2_700.0,
            ..cw()
        };
        let taps = spec.design(44_100.0);
        let gain = filter_gain(&taps, spec.reference_frequency_hz(44_100.0), 44_100.0);
        assert!((gain - 1.0).abs() < 0.05, "{gain}");
    }
}
