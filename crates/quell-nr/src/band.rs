//! Mapping of the analysis band from Hz to bin indices.

use std::ops::Range;

use crate::config::{AnalysisBand, BIN_WIDTH_HZ, NUM_BINS};

/// Half-open range of bins `low..high` processed by the spectral estimators.
///
/// Always non-empty: `1 <= low < high <= NUM_BINS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinRange {
    low: usize,
    high: usize,
}

impl BinRange {
    /// Maps `band` to bins, truncating each edge to the bin containing it.
    ///
    /// The low edge is kept off DC and at least two bins below the top, the
    /// high edge is kept within the retained bins, and a collapsed or
    /// inverted band is widened to one bin.
    pub fn from_band(band: &AnalysisBand) -> Self {
        let low = bin_index(band.low_hz).clamp(1, NUM_BINS - 2);
        let high = bin_index(band.high_hz).clamp(1, NUM_BINS);
        let high = if high <= low { low + 1 } else { high };
        Self { low, high }
    }

    pub fn low(&self) -> usize {
        self.low
    }

    pub fn high(&self) -> usize {
        self.high
    }

    pub fn len(&self) -> usize {
        self.high - self.low
    }

    /// Always false; see the type invariant.
    pub fn is_empty(&self) -> bool {
        self.high == self.low
    }

    pub fn contains(&self, bin: usize) -> bool {
        (self.low..self.high).contains(&bin)
    }

    pub fn bins(&self) -> Range<usize> {
        self.low..self.high
    }
}

impl Default for BinRange {
    fn default() -> Self {
        Self::from_band(&AnalysisBand::default())
    }
}

fn bin_index(hz: f32) -> usize {
    if hz.is_finite() && hz > 0.0 {
        (hz / BIN_WIDTH_HZ) as usize
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use proptest::prop_assert;
    use test_strategy::proptest;

    use super::*;

    #[test]
    fn default_band() {
        let range = BinRange::default();
        assert_eq!(range.low(), 2);
        assert_eq!(range.high(), 83);
    }

    #[test]
    fn degenerate_band_is_widened() {
        let range = BinRange::from_band(&AnalysisBand {
            low_hz: 1_000.0,
            high_hz: 1_000.0,
        });
        assert_eq!(range.len(), 1);
        let inverted = BinRange::from_band(&AnalysisBand {
            low_hz: 3_000.0,
            high_hz: 100.0,
        });
        assert_eq!(inverted.len(), 1);
    }

    #[test]
    fn edges_are_clamped() {
        let range = BinRange::from_band(&AnalysisBand {
            low_hz: 0.0,
            high_hz: 1e9,
        });
        assert_eq!(range.low(), 1);
        assert_eq!(range.high(), NUM_BINS);
        let top = BinRange::from_band(&AnalysisBand {
            low_hz: 1e9,
            high_hz: 1e9,
        });
        assert_eq!(top.low(), NUM_BINS - 2);
        assert_eq!(top.high(), NUM_BINS);
    }

    #[proptest]
    fn range_is_always_valid(low_hz: f32, high_hz: f32) {
        let range = BinRange::from_band(&AnalysisBand { low_hz, high_hz });
        prop_assert!(range.low() >= 1);
        prop_assert!(range.low() < range.high());
        prop_assert!(range.high() <= NUM_BINS);
    }
}
