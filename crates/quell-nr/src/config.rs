//! Block geometry, algorithm constants and tunable parameters.
//!
//! Tunables are plain `Copy` structs read at the start of every block; out of
//! range values are clamped where they are used.

/// Samples per processing block.
pub const BLOCK_SIZE: usize = 256;
/// Processing sample rate: 44.1 kHz decimated by 4.
pub const SAMPLE_RATE_HZ: f32 = 11_025.0;

/// Spectral transform length.
pub const FFT_LEN: usize = 256;
/// Hop between spectral frames; one half-frame.
pub const FFT_LEN_BY_2: usize = FFT_LEN / 2;
/// Non-redundant bins retained per frame.
pub const NUM_BINS: usize = FFT_LEN_BY_2;
/// Width of one bin in Hz.
pub const BIN_WIDTH_HZ: f32 = SAMPLE_RATE_HZ / FFT_LEN as f32;

/// Added to every spectral denominator.
pub const DENOMINATOR_FLOOR: f32 = 1e-10;

// Normalized LMS.
pub const LMS_TAPS: usize = 96;
/// Decorrelation ring: two blocks.
pub const LMS_RING_LEN: usize = 2 * BLOCK_SIZE;
pub const LMS_MIN_STRENGTH: i32 = 0;
pub const LMS_MAX_STRENGTH: i32 = 20;
pub const LMS_DEFAULT_STRENGTH: i32 = 5;

// Variable-leak LMS.
pub const ANR_DLINE_SIZE: usize = 512;
pub const ANR_MASK: usize = ANR_DLINE_SIZE - 1;
pub const ANR_MAX_TAPS: usize = 256;
/// Starting leakage index after a reset.
pub const ANR_INITIAL_LIDX: f32 = 120.0;
pub const ANR_INITIAL_NGAMMA: f32 = 0.001;
pub const ANR_DEN_MULT: f32 = 6.25e-10;
/// Normalized adaptation step `2µ`.
pub const ANR_TWO_MU_RANGE: (f32, f32) = (0.0, 0.1);
pub const ANR_GAMMA_RANGE: (f32, f32) = (0.0, 1.0);
/// Leakage index bounds and steps. At the top of the range the leak equals
/// `gamma`, which keeps the tap decay factor positive.
pub const ANR_LIDX_RANGE: (f32, f32) = (0.0, 200.0);

// Kim & Ruwisch.
/// Frames averaged into the short-term power estimate.
pub const KIM_L_FRAMES: usize = 3;
/// Frames of short-term averages searched for the noise minimum.
pub const KIM_N_FRAMES: usize = 15;
pub const KIM_STRENGTH_RANGE: (f32, f32) = (0.8, 1.0);
pub const KIM_PSI_RANGE: (f32, f32) = (1.0, 6.0);

// Shared spectral smoothing.
pub const ALPHA_RANGE: (f32, f32) = (0.7, 0.99);
pub const BETA_RANGE: (f32, f32) = (0.1, 0.99);

// MMSE.
/// Frames accumulated into the initial noise estimate.
pub const MMSE_WARMUP_FRAMES: usize = 20;

/// Reference power Kim's gain is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GainReference {
    /// The current frame's power.
    CurrentPower,
    /// The short-term average over the last few frames.
    #[default]
    ShortTermAverage,
}

/// Tunables of the Kim & Ruwisch estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KimParams {
    /// Subtraction strength `K`, `0.8..=1.0`.
    pub strength: f32,
    /// Ratio threshold `ψ` above which the minimum replaces the average as
    /// the noise estimate, `1.0..=6.0`.
    pub psi: f32,
    pub reference: GainReference,
}

impl Default for KimParams {
    fn default() -> Self {
        Self {
            strength: 1.0,
            psi: 3.0,
            reference: GainReference::default(),
        }
    }
}

impl KimParams {
    pub(crate) fn clamped(&self) -> Self {
        Self {
            strength: clamp_range(self.strength, KIM_STRENGTH_RANGE),
            psi: clamp_range(self.psi, KIM_PSI_RANGE),
            reference: self.reference,
        }
    }
}

/// Time (`alpha`) and frequency (`beta`) smoothing shared by both spectral
/// estimators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    /// Weight of the previous frame, `0.7..=0.99`.
    pub alpha: f32,
    /// Weight of each neighbouring bin, `0.1..=0.99`.
    pub beta: f32,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            alpha: 0.95,
            beta: 0.25,
        }
    }
}

impl SmoothingParams {
    pub(crate) fn clamped(&self) -> Self {
        Self {
            alpha: clamp_range(self.alpha, ALPHA_RANGE),
            beta: clamp_range(self.beta, BETA_RANGE),
        }
    }

    /// Weight of the centre bin in the three-tap frequency smoother.
    pub fn one_minus_two_beta(&self) -> f32 {
        1.0 - 2.0 * self.beta
    }
}

/// Analysis band in Hz; bins outside it pass unmodified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisBand {
    pub low_hz: f32,
    pub high_hz: f32,
}

impl Default for AnalysisBand {
    fn default() -> Self {
        Self {
            low_hz: 100.0,
            high_hz: 3_600.0,
        }
    }
}

/// Tunables of a variable-leak LMS instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnrParams {
    /// Adaptive taps, `1..=256`.
    pub taps: usize,
    /// Decorrelation delay in samples.
    pub delay: usize,
    /// Adaptation step `2µ`.
    pub two_mu: f32,
    /// Leakage scale.
    pub gamma: f32,
    pub lidx_min: f32,
    pub lidx_max: f32,
    /// Leakage index step when the leaky update looks better.
    pub lidx_increment: f32,
    /// Leakage index step otherwise.
    pub lidx_decrement: f32,
}

impl Default for AnrParams {
    fn default() -> Self {
        Self {
            taps: 64,
            delay: 32,
            two_mu: 1e-4,
            gamma: 0.1,
            lidx_min: 120.0,
            lidx_max: 200.0,
            lidx_increment: 1.0,
            lidx_decrement: 3.0,
        }
    }
}

impl AnrParams {
    /// Taps and delay clamped so the prediction window never reaches the
    /// sample being predicted.
    pub(crate) fn geometry(&self) -> (usize, usize) {
        let taps = self.taps.clamp(1, ANR_MAX_TAPS);
        let delay = self.delay.clamp(1, ANR_MASK - taps);
        (taps, delay)
    }

    /// Copy with every tunable forced into its usable range. NaN falls back
    /// to the default value; `lidx_max` is raised to `lidx_min` if needed.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let (taps, delay) = self.geometry();
        let lidx_min = clamp_or(self.lidx_min, ANR_LIDX_RANGE, defaults.lidx_min);
        let lidx_max = clamp_or(self.lidx_max, ANR_LIDX_RANGE, defaults.lidx_max).max(lidx_min);
        Self {
            taps,
            delay,
            two_mu: clamp_or(self.two_mu, ANR_TWO_MU_RANGE, defaults.two_mu),
            gamma: clamp_or(self.gamma, ANR_GAMMA_RANGE, defaults.gamma),
            lidx_min,
            lidx_max,
            lidx_increment: clamp_or(self.lidx_increment, ANR_LIDX_RANGE, defaults.lidx_increment),
            lidx_decrement: clamp_or(self.lidx_decrement, ANR_LIDX_RANGE, defaults.lidx_decrement),
        }
    }
}

/// Parameters consumed by one spectral block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpectralParams {
    pub kim: KimParams,
    pub smoothing: SmoothingParams,
    pub band: AnalysisBand,
}

fn clamp_range(value: f32, (min, max): (f32, f32)) -> f32 {
    if value.is_nan() { min } else { value.clamp(min, max) }
}

fn clamp_or(value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if value.is_nan() { fallback } else { value.clamp(min, max) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_receiver_firmware() {
        let kim = KimParams::default();
        assert_eq!(kim.strength, 1.0);
        assert_eq!(kim.psi, 3.0);
        assert_eq!(kim.reference, GainReference::ShortTermAverage);
        let smoothing = SmoothingParams::default();
        assert_eq!(smoothing.alpha, 0.95);
        assert_eq!(smoothing.one_minus_two_beta(), 0.5);
        let anr = AnrParams::default();
        assert_eq!(anr.geometry(), (64, 32));
        assert_eq!(BIN_WIDTH_HZ, 11_025.0 / 256.0);
    }

    #[test]
    fn tunables_clamp_into_range() {
        let kim = KimParams {
            strength: 3.0,
            psi: f32::NAN,
            reference: GainReference::CurrentPower,
        }
        .clamped();
        assert_eq!(kim.strength, 1.0);
        assert_eq!(kim.psi, 1.0);
        let smoothing = SmoothingParams {
            alpha: 0.1,
            beta: 2.0,
        }
        .clamped();
        assert_eq!(smoothing.alpha, 0.7);
        assert_eq!(smoothing.beta, 0.99);
    }

    #[test]
    fn anr_geometry_stays_inside_delay_line() {
        let params = AnrParams {
            taps: 10_000,
            delay: 10_000,
            ..AnrParams::default()
        };
        let (taps, delay) = params.geometry();
        assert_eq!(taps, ANR_MAX_TAPS);
        assert!(taps + delay <= ANR_MASK);
        let zero = AnrParams {
            taps: 0,
            delay: 0,
            ..AnrParams::default()
        };
        assert_eq!(zero.geometry(), (1, 1));
    }

    #[test]
    fn anr_tunables_clamp_into_range() {
        let wild = AnrParams {
            taps: 0,
            two_mu: f32::NAN,
            gamma: 1e6,
            lidx_min: 500.0,
            lidx_max: f32::NAN,
            lidx_increment: f32::INFINITY,
            lidx_decrement: -3.0,
            ..AnrParams::default()
        }
        .clamped();
        assert_eq!(wild.taps, 1);
        assert_eq!(wild.two_mu, AnrParams::default().two_mu);
        assert_eq!(wild.gamma, ANR_GAMMA_RANGE.1);
        assert_eq!(wild.lidx_min, ANR_LIDX_RANGE.1);
        assert_eq!(wild.lidx_max, ANR_LIDX_RANGE.1);
        assert_eq!(wild.lidx_increment, ANR_LIDX_RANGE.1);
        assert_eq!(wild.lidx_decrement, 0.0);
        assert_eq!(AnrParams::default().clamped(), AnrParams::default());
    }
}
