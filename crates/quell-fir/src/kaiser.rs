//! Kaiser-windowed FIR design.
//!
//! The window shape is set by a stopband attenuation target through
//! [`kaiser_beta`]. Band responses are built by modulating a lowpass
//! prototype; bandstop and highpass are spectral inversions.

use std::f64::consts::PI;

use crate::CodeError;

/// Series convergence limit for [`bessel_i0`].
const BESSEL_I0_TOLERANCE: f64 = 1e-9;
/// Upper bound on the series length of [`bessel_i0`].
const BESSEL_I0_MAX_TERMS: u32 = 500;
/// Attenuation targets above this are designed as if they were this.
pub const MAX_ATTENUATION_DB: f64 = 200.0;

/// Response shape of a Kaiser design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KaiserResponse {
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
    /// Interleaved complex taps: a pure delay on the real path and a
    /// 90° shifter on the imaginary path.
    Hilbert,
}

impl KaiserResponse {
    /// Numeric code used by the settings store.
    pub const fn code(self) -> u8 {
        match self {
            Self::Lowpass => 0,
            Self::Highpass => 1,
            Self::Bandpass => 2,
            Self::Bandstop => 3,
            Self::Hilbert => 4,
        }
    }
}

impl TryFrom<u8> for KaiserResponse {
    type Error = CodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Lowpass),
            1 => Ok(Self::Highpass),
            2 => Ok(Self::Bandpass),
            3 => Ok(Self::Bandstop),
            4 => Ok(Self::Hilbert),
            other => Err(CodeError::Response(other)),
        }
    }
}

/// Parameters of a Kaiser design.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KaiserSpec {
    pub response: KaiserResponse,
    /// Requested tap count. Everything but lowpass is rounded up to odd.
    pub taps: usize,
    /// Cutoff for lowpass/highpass, band centre for bandpass/bandstop.
    pub frequency_hz: f64,
    /// Half of the band width for bandpass/bandstop.
    pub half_bandwidth_hz: f64,
    /// Stopband attenuation target in dB.
    pub attenuation_db: f64,
    pub sample_rate_hz: f64,
}

/// Kaiser window shape parameter for an attenuation target in dB.
///
/// Targets are clamped to `0..=MAX_ATTENUATION_DB`; NaN designs a
/// rectangular window.
pub fn kaiser_beta(attenuation_db: f64) -> f64 {
    if attenuation_db.is_nan() {
        return 0.0;
    }
    let attenuation_db = attenuation_db.clamp(0.0, MAX_ATTENUATION_DB);
    if attenuation_db >= 50.0 {
        0.1102 * (attenuation_db - 8.71)
    } else if attenuation_db > 21.0 {
        let a = attenuation_db - 21.0;
        0.5842 * a.powf(0.4) + 0.07886 * a
    } else {
        0.0
    }
}

/// Zeroth-order modified Bessel function of the first kind.
///
/// Power series summed until a term falls below `1e-9` of the running sum,
/// for at most [`BESSEL_I0_MAX_TERMS`] terms. Non-finite arguments and sums
/// that overflow return infinity.
pub fn bessel_i0(x: f64) -> f64 {
    if !x.is_finite() {
        return f64::INFINITY;
    }
    let half_x = x / 2.0;
    let mut sum = 1.0;
    let mut term = 1.0;
    for k in 1..=BESSEL_I0_MAX_TERMS {
        let t = half_x / f64::from(k);
        term *= t * t;
        sum += term;
        if !sum.is_finite() {
            return f64::INFINITY;
        }
        if term < BESSEL_I0_TOLERANCE * sum {
            break;
        }
    }
    sum
}

/// Kaiser window of `len` points for shape `beta`.
pub fn kaiser_window(len: usize, beta: f64) -> Vec<f64> {
    let center = len.saturating_sub(1) as f64 / 2.0;
    if center == 0.0 {
        return vec![1.0; len];
    }
    let norm = bessel_i0(beta);
    (0..len)
        .map(|i| {
            let x = (i as f64 - center) / center;
            bessel_i0(beta * (1.0 - x * x).max(0.0).sqrt()) / norm
        })
        .collect()
}

/// Ideal lowpass tap at offset `t` for normalized cutoff `fc`.
fn lowpass_tap(t: f64, fc: f64) -> f64 {
    if t == 0.0 {
        2.0 * fc
    } else {
        (2.0 * PI * fc * t).sin() / (PI * t)
    }
}

fn invert(taps: &mut [f64]) {
    for tap in taps.iter_mut() {
        *tap = -*tap;
    }
    let center = taps.len() / 2;
    taps[center] += 1.0;
}

/// Designs the filter described by `spec`.
///
/// Real responses return `taps` coefficients. [`KaiserResponse::Hilbert`]
/// returns `2 * taps` values interleaved as `(re, im)` pairs.
pub fn design_kaiser(spec: &KaiserSpec) -> Vec<f64> {
    let len = match spec.response {
        KaiserResponse::Lowpass => spec.taps.max(1),
        _ => spec.taps.max(1) | 1,
    };
    let window = kaiser_window(len, kaiser_beta(spec.attenuation_db));
    let center = (len - 1) as f64 / 2.0;
    let fc = spec.frequency_hz / spec.sample_rate_hz;
    let bw = spec.half_bandwidth_hz / spec.sample_rate_hz;

    let bandpass = |i: usize, w: f64| {
        let t = i as f64 - center;
        2.0 * (2.0 * PI * fc * t).cos() * lowpass_tap(t, bw) * w
    };

    match spec.response {
        KaiserResponse::Lowpass => window
            .iter()
            .enumerate()
            .map(|(i, &w)| lowpass_tap(i as f64 - center, fc) * w)
            .collect(),
        KaiserResponse::Highpass => {
            let mut taps: Vec<f64> = window
                .iter()
                .enumerate()
                .map(|(i, &w)| lowpass_tap(i as f64 - center, fc) * w)
                .collect();
            invert(&mut taps);
            taps
        }
        KaiserResponse::Bandpass => window.iter().enumerate().map(|(i, &w)| bandpass(i, w)).collect(),
        KaiserResponse::Bandstop => {
            let mut taps: Vec<f64> = window.iter().enumerate().map(|(i, &w)| bandpass(i, w)).collect();
            invert(&mut taps);
            taps
        }
        KaiserResponse::Hilbert => {
            let mid = len / 2;
            let mut taps = vec![0.0; 2 * len];
            for (i, &w) in window.iter().enumerate() {
                let t = i as i64 - mid as i64;
                if t % 2 != 0 {
                    taps[2 * i + 1] = 2.0 / (PI * t as f64) * w;
                }
            }
            taps[2 * mid] = 1.0;
            taps
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prop_assert;
    use proptest::prop_oneof;
    use proptest::strategy::{Just, Strategy};
    use test_strategy::proptest;

    use super::*;
    use crate::gain::filter_gain;

    fn attenuation() -> impl Strategy<Value = f64> {
        prop_oneof![
            0.0f64..1e6,
            Just(f64::INFINITY),
            Just(f64::NEG_INFINITY),
            Just(f64::NAN),
        ]
    }

    fn spec(response: KaiserResponse) -> KaiserSpec {
        KaiserSpec {
            response,
            taps: 101,
            frequency_hz: 4_000.0,
            half_bandwidth_hz: 1_000.0,
            attenuation_db: 60.0,
            sample_rate_hz: 48_000.0,
        }
    }

    #[test]
    fn beta_branches() {
        assert_eq!(kaiser_beta(10.0), 0.0);
        assert!(kaiser_beta(21.0).abs() < 1e-12);
        let mid = kaiser_beta(30.0);
        let expected = 0.5842 * 9.0f64.powf(0.4) + 0.07886 * 9.0;
        assert!((mid - expected).abs() < 1e-12);
        assert!((kaiser_beta(50.0) - 0.1102 * (50.0 - 8.71)).abs() < 1e-12);
    }

    #[test]
    fn bessel_i0_known_values() {
        assert_eq!(bessel_i0(0.0), 1.0);
        assert!((bessel_i0(1.0) - 1.266_065_877_752_008).abs() < 1e-8);
        assert!((bessel_i0(5.0) - 27.239_871_823_604_44).abs() < 1e-6);
    }

    #[test]
    fn bessel_i0_terminates_on_huge_arguments() {
        assert_eq!(bessel_i0(f64::INFINITY), f64::INFINITY);
        assert_eq!(bessel_i0(f64::NAN), f64::INFINITY);
        assert_eq!(bessel_i0(1e6), f64::INFINITY);
        assert!(bessel_i0(100.0).is_finite());
    }

    #[test]
    fn beta_is_bounded() {
        assert_eq!(kaiser_beta(f64::NAN), 0.0);
        assert_eq!(kaiser_beta(-40.0), 0.0);
        assert_eq!(kaiser_beta(f64::INFINITY), kaiser_beta(MAX_ATTENUATION_DB));
        assert_eq!(kaiser_beta(1e4), kaiser_beta(MAX_ATTENUATION_DB));
    }

    #[proptest]
    fn any_attenuation_designs_finite_taps(
        #[strategy(attenuation())] attenuation_db: f64,
        #[strategy(1usize..64)] taps: usize,
    ) {
        for response in [KaiserResponse::Lowpass, KaiserResponse::Bandpass, KaiserResponse::Hilbert] {
            let designed = design_kaiser(&KaiserSpec {
                taps,
                attenuation_db,
                ..spec(response)
            });
            prop_assert!(designed.iter().all(|t| t.is_finite()), "{response:?} at {attenuation_db} dB");
        }
    }

    #[test]
    fn lowpass_passes_dc() {
        let taps = design_kaiser(&spec(KaiserResponse::Lowpass));
        assert_eq!(taps.len(), 101);
        let dc = filter_gain(&taps, 0.0, 48_000.0);
        let stop = filter_gain(&taps, 12_000.0, 48_000.0);
        assert!((dc - 1.0).abs() < 0.01, "dc {dc}");
        assert!(stop < 0.01, "stop {stop}");
    }

    #[test]
    fn highpass_and_bandstop_are_odd_length() {
        let mut s = spec(KaiserResponse::Highpass);
        s.taps = 100;
        let hp = design_kaiser(&s);
        assert_eq!(hp.len(), 101);
        assert!(filter_gain(&hp, 0.0, 48_000.0) < 0.01);
        s.response = KaiserResponse::Bandstop;
        let bs = design_kaiser(&s);
        assert_eq!(bs.len(), 101);
        assert!(filter_gain(&bs, 4_000.0, 48_000.0) < 0.05);
        assert!((filter_gain(&bs, 0.0, 48_000.0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn bandpass_peaks_at_center() {
        let taps = design_kaiser(&spec(KaiserResponse::Bandpass));
        let center = filter_gain(&taps, 4_000.0, 48_000.0);
        let dc = filter_gain(&taps, 0.0, 48_000.0);
        assert!((center - 1.0).abs() < 0.02, "center {center}");
        assert!(dc < 0.01, "dc {dc}");
    }

    #[test]
    fn hilbert_layout() {
        let taps = design_kaiser(&spec(KaiserResponse::Hilbert));
        assert_eq!(taps.len(), 202);
        let mid = 50;
        for i in 0..101 {
            let re = taps[2 * i];
            let im = taps[2 * i + 1];
            if i == mid {
                assert_eq!(re, 1.0);
            } else {
                assert_eq!(re, 0.0, "real tap {i}");
            }
            let t = i as i64 - mid as i64;
            if t % 2 == 0 {
                assert_eq!(im, 0.0, "even offset {t}");
            } else {
                assert!(im != 0.0, "odd offset {t}");
                let mirror = taps[2 * (2 * mid - i) + 1];
                assert!((im + mirror).abs() < 1e-12, "antisymmetry at {t}");
            }
        }
    }

    #[test]
    fn response_codes() {
        for code in 0..=4 {
            let response = KaiserResponse::try_from(code).unwrap();
            assert_eq!(response.code(), code);
        }
        assert_eq!(KaiserResponse::try_from(5), Err(CodeError::Response(5)));
    }
}
