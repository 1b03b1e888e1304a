//! Noise reduction configuration.
//!
//! [`Config`] is supplied at construction. Individual tunables can then be
//! changed with [`RuntimeSetting`]s, which are queued and applied at the
//! start of the next block.

pub use quell_nr::config::{AnalysisBand, AnrParams, GainReference, KimParams, SmoothingParams};
use quell_nr::config::{LMS_DEFAULT_STRENGTH, LMS_MAX_STRENGTH, LMS_MIN_STRENGTH, SpectralParams};
use quell_nr::smoothing::{FNR_LEVELS, FNRA_LEVELS};

use crate::NrMode;

/// Top-level configuration of the noise reduction engine.
///
/// Defaults match the receiver's factory settings.
///
/// # Example
///
/// ```
/// use quell::config::{Config, KimParams};
/// use quell::NrMode;
///
/// let config = Config {
///     mode: NrMode::Kim,
///     kim: KimParams {
///         psi: 4.0,
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Mode active after construction.
    pub mode: NrMode,
    /// Run the automatic notch after the active mode (except in bypass).
    pub notch: bool,
    pub lms: Lms,
    pub kim: KimParams,
    /// Time and frequency smoothing shared by the spectral modes.
    pub smoothing: SmoothingParams,
    /// Band analysed by the spectral modes.
    pub band: AnalysisBand,
    /// Shared by the leaky LMS mode and the notch.
    pub anr: AnrParams,
    pub heuristic: Heuristic,
}

impl Config {
    pub(crate) fn spectral_params(&self) -> SpectralParams {
        SpectralParams {
            kim: self.kim,
            smoothing: self.smoothing,
            band: self.band,
        }
    }

    /// Applies `setting`. Returns true when the LMS filter must be
    /// reinitialized.
    pub(crate) fn apply(&mut self, setting: RuntimeSetting) -> bool {
        match setting {
            RuntimeSetting::LmsStrength(strength) => {
                self.lms.strength = strength.clamp(LMS_MIN_STRENGTH, LMS_MAX_STRENGTH);
                return true;
            }
            RuntimeSetting::KimStrength(strength) => self.kim.strength = strength,
            RuntimeSetting::KimPsi(psi) => self.kim.psi = psi,
            RuntimeSetting::KimReference(reference) => self.kim.reference = reference,
            RuntimeSetting::SmoothingAlpha(alpha) => self.smoothing.alpha = alpha,
            RuntimeSetting::SmoothingBeta(beta) => self.smoothing.beta = beta,
            RuntimeSetting::AnalysisBand(band) => self.band = band,
            RuntimeSetting::Anr(anr) => self.anr = anr.clamped(),
            RuntimeSetting::Notch(enabled) => self.notch = enabled,
            RuntimeSetting::FnrLevel(level) => {
                self.heuristic.fnr_level = level.clamp(FNR_LEVELS.0, FNR_LEVELS.1);
            }
            RuntimeSetting::FnraLevel(level) => {
                self.heuristic.fnra_level = level.clamp(FNRA_LEVELS.0, FNRA_LEVELS.1);
            }
        }
        false
    }
}

/// Normalized LMS settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lms {
    /// Integer strength in `0..=20`; higher adapts more slowly.
    pub strength: i32,
}

impl Default for Lms {
    fn default() -> Self {
        Self {
            strength: LMS_DEFAULT_STRENGTH,
        }
    }
}

/// Levels of the FNR and FNRA smoothers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heuristic {
    /// FNR level in `1..=3`.
    pub fnr_level: u8,
    /// FNRA level in `4..=6`.
    pub fnra_level: u8,
}

impl Default for Heuristic {
    fn default() -> Self {
        Self {
            fnr_level: 2,
            fnra_level: 5,
        }
    }
}

/// Tunable changes applied without rebuilding the engine.
///
/// These are enqueued and applied at the start of the next call to
/// [`NoiseReduction::process_block()`](crate::NoiseReduction::process_block).
/// Changing the LMS strength reinitializes the LMS filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuntimeSetting {
    LmsStrength(i32),
    KimStrength(f32),
    KimPsi(f32),
    KimReference(GainReference),
    SmoothingAlpha(f32),
    SmoothingBeta(f32),
    AnalysisBand(AnalysisBand),
    Anr(AnrParams),
    Notch(bool),
    FnrLevel(u8),
    FnraLevel(u8),
}
