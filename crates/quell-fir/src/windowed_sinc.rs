//! Windowed-sinc FIR design.
//!
//! Every family is derived from one windowed lowpass prototype:
//!
//! - highpass: spectral inversion of a lowpass,
//! - bandstop: lowpass at the low edge plus highpass at the high edge,
//! - bandpass: spectral inversion of the bandstop.
//!
//! Cutoffs are normalized frequencies (`hz / sample_rate`) and must lie
//! strictly inside `(0, 0.5)`. Spectral inversion adds one to the centre
//! tap `(len - 1) / 2`, which is only a true inversion for odd lengths.

use std::f64::consts::PI;

use crate::{CodeError, Window};

/// Q15 full scale used when quantizing taps.
pub const Q15_FULL_SCALE: f64 = 32767.0;

/// Frequency response family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterFamily {
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
}

impl FilterFamily {
    /// Numeric code used by the settings store.
    pub const fn code(self) -> u8 {
        match self {
            Self::Lowpass => 1,
            Self::Highpass => 2,
            Self::Bandpass => 3,
            Self::Bandstop => 4,
        }
    }

    /// Whether the design relies on a centre tap and therefore needs an odd
    /// length.
    pub const fn needs_center_tap(self) -> bool {
        !matches!(self, Self::Lowpass)
    }
}

impl TryFrom<u8> for FilterFamily {
    type Error = CodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Lowpass),
            2 => Ok(Self::Highpass),
            3 => Ok(Self::Bandpass),
            4 => Ok(Self::Bandstop),
            other => Err(CodeError::Family(other)),
        }
    }
}

fn debug_check_cutoff(cutoff: f64) {
    debug_assert!(
        cutoff > 0.0 && cutoff < 0.5,
        "normalized cutoff {cutoff} outside (0, 0.5)"
    );
}

/// Ideal lowpass impulse response of `len` taps, centred on `(len - 1) / 2`.
///
/// The centre value is `2 fc`; elsewhere `sin(2π fc n) / (π n)`.
pub fn generate_sinc(len: usize, cutoff: f64) -> Vec<f64> {
    debug_check_cutoff(cutoff);
    let center = len.saturating_sub(1) as f64 / 2.0;
    (0..len)
        .map(|i| {
            let n = i as f64 - center;
            if n == 0.0 {
                2.0 * cutoff
            } else {
                (2.0 * PI * cutoff * n).sin() / (PI * n)
            }
        })
        .collect()
}

/// Negates every tap and adds one at the centre tap.
pub fn spectral_invert(taps: &mut [f64]) {
    for tap in taps.iter_mut() {
        *tap = -*tap;
    }
    if let Some(center) = taps.get_mut(taps.len().saturating_sub(1) / 2) {
        *center += 1.0;
    }
}

/// Windowed lowpass.
pub fn lowpass(len: usize, window: Window, cutoff: f64) -> Vec<f64> {
    let mut taps = generate_sinc(len, cutoff);
    window.apply(&mut taps);
    taps
}

/// Windowed highpass: the spectral inversion of [`lowpass`].
pub fn highpass(len: usize, window: Window, cutoff: f64) -> Vec<f64> {
    let mut taps = lowpass(len, window, cutoff);
    spectral_invert(&mut taps);
    taps
}

/// Bandstop rejecting `low..high`: lowpass at `low` plus highpass at `high`.
pub fn bandstop(len: usize, window: Window, low: f64, high: f64) -> Vec<f64> {
    let mut taps = lowpass(len, window, low);
    for (tap, hp) in taps.iter_mut().zip(highpass(len, window, high)) {
        *tap += hp;
    }
    taps
}

/// Bandpass passing `low..high`: the spectral inversion of [`bandstop`].
pub fn bandpass(len: usize, window: Window, low: f64, high: f64) -> Vec<f64> {
    let mut taps = bandstop(len, window, low, high);
    spectral_invert(&mut taps);
    taps
}

/// Designs a filter of the given family.
///
/// Single-cutoff families use their passband edge: `high` for lowpass and
/// `low` for highpass.
pub fn design(family: FilterFamily, len: usize, window: Window, low: f64, high: f64) -> Vec<f64> {
    match family {
        FilterFamily::Lowpass => lowpass(len, window, high),
        FilterFamily::Highpass => highpass(len, window, low),
        FilterFamily::Bandpass => bandpass(len, window, low, high),
        FilterFamily::Bandstop => bandstop(len, window, low, high),
    }
}

/// Quantizes taps to 16-bit fixed point at full scale, saturating.
pub fn quantize(taps: &[f64]) -> Vec<i16> {
    taps.iter().map(|&h| (h * Q15_FULL_SCALE) as i16).collect()
}
