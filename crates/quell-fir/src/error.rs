use std::error::Error;
use std::fmt;

/// A numeric design code that does not name a known window, family or
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeError {
    /// Window codes are 1 (Blackman), 2 (Hanning), 3 (Hamming).
    Window(u8),
    /// Filter family codes are 1 (lowpass) through 4 (bandstop).
    Family(u8),
    /// Kaiser response codes are 0 (lowpass) through 4 (Hilbert).
    Response(u8),
}

impl fmt::Display for CodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Window(code) => write!(f, "unknown window code {code}; expected 1..=3"),
            Self::Family(code) => write!(f, "unknown filter family code {code}; expected 1..=4"),
            Self::Response(code) => {
                write!(f, "unknown Kaiser response code {code}; expected 0..=4")
            }
        }
    }
}

impl Error for CodeError {}
