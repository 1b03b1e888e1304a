#![no_main]

use libfuzzer_sys::fuzz_target;
use quell::{BLOCK_SIZE, Config, NoiseReduction, NrMode};

fuzz_target!(|input: (u8, bool, Vec<f32>)| {
    let (code, notch, samples) = input;
    let Ok(mode) = NrMode::try_from(code) else {
        return;
    };
    if samples.len() < BLOCK_SIZE {
        return;
    }

    let mut nr = NoiseReduction::builder()
        .config(Config {
            mode,
            notch,
            ..Default::default()
        })
        .build();

    for chunk in samples.chunks_exact(BLOCK_SIZE) {
        let mut block = [0.0f32; BLOCK_SIZE];
        // Keep the input in the range a codec can deliver.
        for (dst, &src) in block.iter_mut().zip(chunk) {
            *dst = if src.is_finite() { src.clamp(-1.0, 1.0) } else { 0.0 };
        }
        nr.process_block(&mut block);
        assert!(block.iter().all(|s| s.is_finite()), "{mode:?} produced a non-finite sample");
    }
});
