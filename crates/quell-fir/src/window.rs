//! Symmetric window functions for the windowed-sinc designer.

use std::f64::consts::PI;

use crate::CodeError;

/// Window applied to the sinc prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    /// `0.42 - 0.5 cos(x) + 0.08 cos(2x)`.
    Blackman,
    /// `0.5 - 0.5 cos(x)`.
    Hanning,
    /// `0.54 - 0.46 cos(x)`.
    Hamming,
}

impl Window {
    /// Numeric code used by the settings store.
    pub const fn code(self) -> u8 {
        match self {
            Self::Blackman => 1,
            Self::Hanning => 2,
            Self::Hamming => 3,
        }
    }

    /// Window value at tap `index` of a `len`-tap filter.
    ///
    /// The window is symmetric: `x = 2πi / (len - 1)`. A single tap gets 1.
    pub fn value(self, index: usize, len: usize) -> f64 {
        if len < 2 {
            return 1.0;
        }
        let x = 2.0 * PI * index as f64 / (len - 1) as f64;
        match self {
            Self::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
            Self::Hanning => 0.5 - 0.5 * x.cos(),
            Self::Hamming => 0.54 - 0.46 * x.cos(),
        }
    }

    /// Multiplies `taps` by the window in place.
    pub fn apply(self, taps: &mut [f64]) {
        let len = taps.len();
        for (i, tap) in taps.iter_mut().enumerate() {
            *tap *= self.value(i, len);
        }
    }
}

impl TryFrom<u8> for Window {
    type Error = CodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Blackman),
            2 => Ok(Self::Hanning),
            3 => Ok(Self::Hamming),
            other => Err(CodeError::Window(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_are_symmetric() {
        for window in [Window::Blackman, Window::Hanning, Window::Hamming] {
            let len = 31;
            for i in 0..len {
                let a = window.value(i, len);
                let b = window.value(len - 1 - i, len);
                assert!((a - b).abs() < 1e-12, "{window:?} tap {i}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn endpoints_and_peak() {
        let len = 101;
        assert!(Window::Hanning.value(0, len).abs() < 1e-12);
        assert!((Window::Hamming.value(0, len) - 0.08).abs() < 1e-12);
        assert!(Window::Blackman.value(0, len).abs() < 1e-12);
        for window in [Window::Blackman, Window::Hanning, Window::Hamming] {
            assert!((window.value(50, len) - 1.0).abs() < 1e-12, "{window:?}");
        }
    }

    #[test]
    fn single_tap_is_unity() {
        assert_eq!(Window::Blackman.value(0, 1), 1.0);
    }

    #[test]
    fn codes_round_trip() {
        for window in [Window::Blackman, Window::Hanning, Window::Hamming] {
            assert_eq!(Window::try_from(window.code()), Ok(window));
        }
        assert_eq!(Window::try_from(0), Err(CodeError::Window(0)));
        assert_eq!(Window::try_from(4), Err(CodeError::Window(4)));
    }
}
