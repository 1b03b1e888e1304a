//! Minimal noise reduction demo.
//!
//! Feeds a noisy tone through every mode and prints how much energy each one
//! removed.
//!
//! ```sh
//! RUST_LOG=quell=debug cargo run -p quell --example simple
//! ```

use std::f32::consts::PI;

use quell::{BLOCK_SIZE, NoiseReduction, NrMode, SAMPLE_RATE_HZ};
use tracing_subscriber::EnvFilter;

const NUM_BLOCKS: usize = 200;
const TONE_HZ: f32 = 700.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input = noisy_tone(NUM_BLOCKS * BLOCK_SIZE);
    let energy_in = energy(&input);

    let mut nr = NoiseReduction::builder().build();
    for mode in NrMode::ALL {
        nr.select_mode(mode);

        let mut output = input.clone();
        for chunk in output.chunks_exact_mut(BLOCK_SIZE) {
            let block: &mut [f32; BLOCK_SIZE] = chunk.try_into().unwrap();
            nr.process_block(block);
        }

        // Skip the first half so adaptive modes have converged.
        let half = output.len() / 2;
        let ratio = energy(&output[half..]) / energy(&input[half..]);
        println!(
            "{mode:?} (code {}): output/input energy {:.3} dB",
            mode.code(),
            10.0 * ratio.log10()
        );
    }

    println!("Input energy: {energy_in:.1}");
}

/// A tone buried in uniform noise from a small LCG.
fn noisy_tone(len: usize) -> Vec<f32> {
    let mut seed = 0x1234_5678u32;
    (0..len)
        .map(|i| {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let noise = (seed >> 8) as f32 / (1u32 << 24) as f32 - 0.5;
            let phase = 2.0 * PI * TONE_HZ * i as f32 / SAMPLE_RATE_HZ;
            0.3 * phase.sin() + 0.2 * noise
        })
        .collect()
}

fn energy(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s * s).sum()
}
