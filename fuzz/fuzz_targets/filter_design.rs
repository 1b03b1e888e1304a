#![no_main]

use libfuzzer_sys::fuzz_target;
use quell::{FilterBank, FilterPreset};
use quell_fir::kaiser::{KaiserResponse, KaiserSpec, design_kaiser};

fuzz_target!(|input: (u8, f32, f32, u8, u16, f32)| {
    let (preset, low_hz, high_hz, response, taps, attenuation_db) = input;

    let mut bank = FilterBank::default();
    bank.select(FilterPreset::ALL[usize::from(preset) % FilterPreset::ALL.len()]);
    let before = bank.coefficients().to_vec();
    if bank.set_edges(f64::from(low_hz), f64::from(high_hz)).is_err() {
        assert_eq!(bank.coefficients(), before.as_slice());
    }

    let Ok(response) = KaiserResponse::try_from(response) else {
        return;
    };
    let spec = KaiserSpec {
        response,
        taps: usize::from(taps % 512).max(1),
        frequency_hz: f64::from(low_hz.abs().min(20_000.0)),
        half_bandwidth_hz: f64::from(high_hz.abs().min(10_000.0)),
        attenuation_db: f64::from(attenuation_db.clamp(0.0, 120.0)),
        sample_rate_hz: 44_100.0,
    };
    let taps = design_kaiser(&spec);
    assert!(taps.iter().all(|t| t.is_finite()));
});
