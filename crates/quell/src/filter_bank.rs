//! Receive bandwidth filter presets with gain-normalized Q15 coefficients.

use std::error::Error;
use std::fmt;

use quell_fir::gain::{filter_gain, scale_coefficients, unity_gain_multiplier};
use quell_fir::{FilterFamily, FilterSpec, Window};
use tracing::{debug, warn};

/// Sample rate the bandwidth filters run at.
pub const FIR_SAMPLE_RATE_HZ: f64 = 44_100.0;
/// Requested length of every preset; inverted families round up to odd.
pub const PRESET_TAPS: usize = 200;
/// Passband gain after normalization.
const HEADROOM: f64 = 0.9;
/// Upper bound on the normalization multiplier.
const MAX_NORMALIZATION_GAIN: f64 = 2.0;

/// Bandwidth presets selectable from the radio's menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterPreset {
    PassThru,
    Ssb,
    Cw,
    Am,
    Fm,
}

impl FilterPreset {
    pub const ALL: [Self; 5] = [Self::PassThru, Self::Ssb, Self::Cw, Self::Am, Self::Fm];

    /// Factory passband edges in Hz.
    pub const fn edges_hz(self) -> (f64, f64) {
        match self {
            Self::PassThru => (60.0, 20_000.0),
            Self::Ssb => (300.0, 2_700.0),
            Self::Cw => (450.0, 950.0),
            Self::Am => (50.0, 11_000.0),
            Self::Fm => (50.0, 16_000.0),
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn factory_spec(self) -> FilterSpec {
        let (low_hz, high_hz) = self.edges_hz();
        FilterSpec {
            family: FilterFamily::Bandpass,
            window: Window::Hamming,
            taps: PRESET_TAPS,
            low_hz,
            high_hz,
        }
    }
}

/// Rejected passband edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterEditError {
    pub preset: FilterPreset,
    pub low_hz: f64,
    pub high_hz: f64,
}

impl fmt::Display for FilterEditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid passband {}..{} Hz for {:?}",
            self.low_hz, self.high_hz, self.preset
        )
    }
}

impl Error for FilterEditError {}

/// Preset filter specs plus the coefficients of the selected one.
#[derive(Debug, Clone)]
pub struct FilterBank {
    sample_rate_hz: f64,
    specs: [FilterSpec; 5],
    selected: FilterPreset,
    coefficients: Vec<i16>,
}

impl Default for FilterBank {
    fn default() -> Self {
        Self::new(FIR_SAMPLE_RATE_HZ)
    }
}

impl FilterBank {
    /// Creates the bank with factory presets and [`FilterPreset::Ssb`]
    /// selected.
    pub fn new(sample_rate_hz: f64) -> Self {
        let mut bank = Self {
            sample_rate_hz,
            specs: FilterPreset::ALL.map(FilterPreset::factory_spec),
            selected: FilterPreset::Ssb,
            coefficients: Vec::new(),
        };
        bank.redesign();
        bank
    }

    pub fn selected(&self) -> FilterPreset {
        self.selected
    }

    pub fn spec(&self, preset: FilterPreset) -> &FilterSpec {
        &self.specs[preset.index()]
    }

    /// Q15 coefficients of the selected preset.
    pub fn coefficients(&self) -> &[i16] {
        &self.coefficients
    }

    pub fn select(&mut self, preset: FilterPreset) {
        self.selected = preset;
        self.redesign();
    }

    /// Edits the passband of the selected preset. A zero edge keeps the
    /// current value. Invalid bands are rejected and the previous
    /// coefficients stay in place.
    pub fn set_edges(&mut self, low_hz: f64, high_hz: f64) -> Result<(), FilterEditError> {
        let current = self.specs[self.selected.index()];
        let candidate = FilterSpec {
            low_hz: if low_hz == 0.0 { current.low_hz } else { low_hz },
            high_hz: if high_hz == 0.0 { current.high_hz } else { high_hz },
            ..current
        };
        if candidate == current {
            return Ok(());
        }
        if !candidate.is_valid() || candidate.high_hz >= self.sample_rate_hz / 2.0 {
            warn!(
                preset = ?self.selected,
                low_hz = candidate.low_hz,
                high_hz = candidate.high_hz,
                "rejecting filter edit"
            );
            return Err(FilterEditError {
                preset: self.selected,
                low_hz: candidate.low_hz,
                high_hz: candidate.high_hz,
            });
        }
        self.specs[self.selected.index()] = candidate;
        self.redesign();
        Ok(())
    }

    fn redesign(&mut self) {
        let spec = self.specs[self.selected.index()];
        let mut coefficients = spec.design_q15(self.sample_rate_hz);
        let reference_hz = spec.reference_frequency_hz(self.sample_rate_hz);
        let gain = filter_gain(&coefficients, reference_hz, self.sample_rate_hz);
        let multiplier = unity_gain_multiplier(gain, HEADROOM, MAX_NORMALIZATION_GAIN);
        scale_coefficients(&mut coefficients, multiplier);
        debug!(
            preset = ?self.selected,
            taps = coefficients.len(),
            gain,
            multiplier,
            "bandwidth filter designed"
        );
        self.coefficients = coefficients;
    }
}
