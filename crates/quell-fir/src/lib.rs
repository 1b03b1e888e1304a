//! FIR coefficient designers for the receive-bandwidth filter.
//!
//! Two independent designers are provided:
//!
//! - [`windowed_sinc`]: classic windowed-sinc lowpass, highpass, bandpass and
//!   bandstop designs, built from a lowpass prototype by spectral inversion
//!   and summation. [`FilterSpec`] is the entry point used by the preset table.
//! - [`kaiser`]: Kaiser-windowed designs parameterized by a stopband
//!   attenuation, including a Hilbert transformer.
//!
//! [`gain`] measures the response of a coefficient set at one frequency and
//! rescales it. All designers return `f64` taps; [`windowed_sinc::quantize`]
//! converts to the 16-bit taps consumed by the convolution stage.

mod error;
mod filter_spec;
pub mod gain;
pub mod kaiser;
pub mod window;
pub mod windowed_sinc;

pub use error::CodeError;
pub use filter_spec::{FilterSpec, MAX_NORMALIZED_CUTOFF, MIN_NORMALIZED_CUTOFF};
pub use window::Window;
pub use windowed_sinc::FilterFamily;
