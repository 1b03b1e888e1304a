//! Noise-reduction mode codes.

use std::error::Error;
use std::fmt;

/// Active noise-reduction algorithm.
///
/// The discriminants are the codes stored by the settings layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum NrMode {
    /// No processing at all; the block is left untouched.
    Bypass = 0,
    /// Noise reduction off; the notch still runs when enabled.
    Off = 1,
    /// Normalized LMS.
    Lms = 2,
    /// Kim & Ruwisch spectral subtraction.
    Kim = 3,
    /// Exponential smoothing.
    Fnr = 4,
    /// Moving-average smoothing.
    Fnra = 5,
    /// MMSE spectral estimator.
    #[default]
    Mmse = 6,
    /// Variable-leak LMS predictor.
    LeakyLms = 7,
}

impl NrMode {
    /// Highest valid mode code.
    pub const MAX_CODE: u8 = Self::LeakyLms as u8;

    pub const ALL: [Self; 8] = [
        Self::Bypass,
        Self::Off,
        Self::Lms,
        Self::Kim,
        Self::Fnr,
        Self::Fnra,
        Self::Mmse,
        Self::LeakyLms,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for NrMode {
    type Error = ModeCodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(ModeCodeError { code })
    }
}

/// Error returned for a mode code above [`NrMode::MAX_CODE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeCodeError {
    pub code: u8,
}

impl fmt::Display for ModeCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown noise reduction mode {}; expected 0..={}",
            self.code,
            NrMode::MAX_CODE
        )
    }
}

impl Error for ModeCodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_table_order() {
        for (i, mode) in NrMode::ALL.iter().enumerate() {
            assert_eq!(usize::from(mode.code()), i);
            assert_eq!(NrMode::try_from(mode.code()), Ok(*mode));
        }
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(NrMode::try_from(8), Err(ModeCodeError { code: 8 }));
        assert_eq!(NrMode::try_from(255), Err(ModeCodeError { code: 255 }));
        let message = ModeCodeError { code: 9 }.to_string();
        assert!(message.contains('9') && message.contains("0..=7"), "{message}");
    }

    #[test]
    fn default_is_mmse() {
        assert_eq!(NrMode::default(), NrMode::Mmse);
    }
}
