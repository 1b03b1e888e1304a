#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quell::config::{AnalysisBand, AnrParams, GainReference};
use quell::{BLOCK_SIZE, NoiseReduction, RuntimeSetting};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    steps: Vec<FuzzStep>,
    /// Audio processed after every step
    samples: Vec<f32>,
}

#[derive(Debug, Arbitrary)]
enum FuzzStep {
    Mode(u8),
    LmsStrength(i32),
    KimStrength(f32),
    KimPsi(f32),
    KimReference(bool),
    SmoothingAlpha(f32),
    SmoothingBeta(f32),
    Band(u16, u16),
    Anr { taps: u16, delay: u16, two_mu: f32, gamma: f32 },
    Notch(bool),
    FnrLevel(u8),
    FnraLevel(u8),
}

fn setting(step: &FuzzStep) -> Option<RuntimeSetting> {
    let setting = match *step {
        FuzzStep::Mode(_) => return None,
        FuzzStep::LmsStrength(s) => RuntimeSetting::LmsStrength(s),
        FuzzStep::KimStrength(s) => RuntimeSetting::KimStrength(s),
        FuzzStep::KimPsi(p) => RuntimeSetting::KimPsi(p),
        FuzzStep::KimReference(current) => RuntimeSetting::KimReference(if current {
            GainReference::CurrentPower
        } else {
            GainReference::ShortTermAverage
        }),
        FuzzStep::SmoothingAlpha(a) => RuntimeSetting::SmoothingAlpha(a),
        FuzzStep::SmoothingBeta(b) => RuntimeSetting::SmoothingBeta(b),
        FuzzStep::Band(low, high) => RuntimeSetting::AnalysisBand(AnalysisBand {
            low_hz: f32::from(low),
            high_hz: f32::from(high),
        }),
        FuzzStep::Anr {
            taps,
            delay,
            two_mu,
            gamma,
        } => RuntimeSetting::Anr(AnrParams {
            taps: usize::from(taps),
            delay: usize::from(delay),
            two_mu,
            gamma,
            ..Default::default()
        }),
        FuzzStep::Notch(enabled) => RuntimeSetting::Notch(enabled),
        FuzzStep::FnrLevel(l) => RuntimeSetting::FnrLevel(l),
        FuzzStep::FnraLevel(l) => RuntimeSetting::FnraLevel(l),
    };
    Some(setting)
}

fuzz_target!(|input: FuzzInput| {
    if input.samples.len() < BLOCK_SIZE || input.steps.is_empty() {
        return;
    }

    let mut block = [0.0f32; BLOCK_SIZE];
    for (dst, &src) in block.iter_mut().zip(&input.samples) {
        *dst = if src.is_finite() { src.clamp(-1.0, 1.0) } else { 0.0 };
    }

    let mut nr = NoiseReduction::builder().build();
    for step in &input.steps {
        match setting(step) {
            Some(setting) => nr.set_runtime_setting(setting),
            None => {
                if let FuzzStep::Mode(code) = *step {
                    let _ = nr.select_mode_code(code);
                }
            }
        }
        let mut out = block;
        nr.process_block(&mut out);
        assert!(out.iter().all(|s| s.is_finite()), "non-finite output after {step:?}");
    }
});
