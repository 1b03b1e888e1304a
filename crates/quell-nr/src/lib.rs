//! Noise reduction for decimated receiver audio.
//!
//! All processors work in place on fixed blocks of [`config::BLOCK_SIZE`]
//! samples at [`config::SAMPLE_RATE_HZ`]:
//!
//! - [`lms::NormalizedLms`]: normalized LMS with a one-block decorrelation
//!   delay.
//! - [`anr::VariableLeakLms`]: leaky LMS predictor used either as a noise
//!   reducer or as an automatic notch.
//! - [`spectral::SpectralNoiseReducer`]: half-overlapped STFT driven by the
//!   Kim & Ruwisch ([`kim`]) or MMSE ([`mmse`]) gain estimator.
//! - [`smoothing`]: per-sample heuristic smoothers.
//!
//! Processors never allocate after construction and hold no shared state;
//! each is reset explicitly by its owner.

pub mod anr;
pub mod band;
pub mod config;
pub mod frame_engine;
pub mod kim;
pub mod lms;
pub mod mmse;
pub mod smoothing;
pub mod spectral;
