//! Record receiver audio, run it through quell, and write WAV files.
//!
//! Reads from the default input device, or from a mono WAV file with
//! `--input`. Writes both raw and processed audio so you can compare them.
//!
//! ```sh
//! cargo run -p quell --features examples --example recording -- --duration 10 --mode 6
//! cargo run -p quell --features examples --example recording -- --input noisy.wav --mode 3 --notch
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail, ensure};
use clap::Parser;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hound::{WavReader, WavWriter};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer, Observer, Producer, Split};

use quell::{BLOCK_SIZE, Config, NoiseReduction, NrMode, RuntimeSetting, SAMPLE_RATE_HZ};

const SAMPLE_RATE: u32 = SAMPLE_RATE_HZ as u32;
const NUM_CHANNELS: u16 = 1;

#[derive(Parser, Debug)]
#[command(about = "Record and process receiver audio through quell")]
struct Args {
    /// Recording duration in seconds.
    #[arg(short, long, default_value_t = 5)]
    duration: u64,

    /// Process this mono WAV file instead of the input device.
    #[arg(long)]
    input: Option<String>,

    /// Path for the raw (unprocessed) recording.
    #[arg(long, default_value = "raw.wav")]
    raw_output: String,

    /// Path for the processed recording.
    #[arg(long, default_value = "processed.wav")]
    processed_output: String,

    /// Noise reduction mode code (0 bypass .. 7 leaky LMS).
    #[arg(short, long, default_value_t = NrMode::Mmse.code())]
    mode: u8,

    /// Enable the automatic notch.
    #[arg(long)]
    notch: bool,

    /// LMS strength, 0..=20.
    #[arg(long)]
    lms_strength: Option<i32>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mode = NrMode::try_from(args.mode)?;
    let mut nr = NoiseReduction::builder()
        .config(Config {
            mode,
            notch: args.notch,
            ..Default::default()
        })
        .build();
    if let Some(strength) = args.lms_strength {
        nr.set_runtime_setting(RuntimeSetting::LmsStrength(strength));
    }
    println!("Mode: {mode:?}, notch: {}", args.notch);

    let spec = hound::WavSpec {
        channels: NUM_CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut raw_writer = WavWriter::create(&args.raw_output, spec)?;
    let mut proc_writer = WavWriter::create(&args.processed_output, spec)?;

    let mut process = |block: &mut [f32; BLOCK_SIZE]| -> Result<()> {
        for &s in block.iter() {
            raw_writer.write_sample(s)?;
        }
        nr.process_block(block);
        for &s in block.iter() {
            proc_writer.write_sample(s)?;
        }
        Ok(())
    };

    match &args.input {
        Some(path) => process_file(path, &mut process)?,
        None => record(&args, &mut process)?,
    }

    raw_writer.finalize()?;
    proc_writer.finalize()?;

    println!("Wrote {} and {}", args.raw_output, args.processed_output);

    Ok(())
}

fn process_file(path: &str, process: &mut impl FnMut(&mut [f32; BLOCK_SIZE]) -> Result<()>) -> Result<()> {
    let mut reader = WavReader::open(path).with_context(|| format!("opening {path}"))?;
    let spec = reader.spec();
    ensure!(spec.channels == NUM_CHANNELS, "expected a mono file, got {} channels", spec.channels);
    if spec.sample_rate != SAMPLE_RATE {
        println!(
            "Warning: {path} is {} Hz; quell expects {SAMPLE_RATE} Hz",
            spec.sample_rate
        );
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1u32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let mut block = [0.0f32; BLOCK_SIZE];
    for chunk in samples.chunks(BLOCK_SIZE) {
        block.fill(0.0);
        block[..chunk.len()].copy_from_slice(chunk);
        process(&mut block)?;
    }
    Ok(())
}

fn record(args: &Args, process: &mut impl FnMut(&mut [f32; BLOCK_SIZE]) -> Result<()>) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));

    ctrlc::set_handler({
        let running = running.clone();
        move || running.store(false, Ordering::SeqCst)
    })?;

    let host = cpal::default_host();
    let input_device = host
        .default_input_device()
        .context("no input device available")?;
    println!("Recording from: {}", input_device.name()?);

    let cpal_config = cpal::StreamConfig {
        channels: NUM_CHANNELS,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    let ring_size = BLOCK_SIZE * 8;
    let (mut prod, mut cons) = HeapRb::<f32>::new(ring_size).split();

    let input_stream = input_device.build_input_stream(
        &cpal_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            prod.push_slice(data);
        },
        |err| eprintln!("input error: {err}"),
        None,
    )?;

    input_stream.play()?;

    println!(
        "Recording for {} seconds (Ctrl+C to stop early)...",
        args.duration
    );

    let deadline = Instant::now() + Duration::from_secs(args.duration);
    let mut block = [0.0f32; BLOCK_SIZE];

    while running.load(Ordering::SeqCst) && Instant::now() < deadline {
        if cons.occupied_len() < BLOCK_SIZE {
            thread::sleep(Duration::from_millis(1));
            continue;
        }

        if cons.pop_slice(&mut block) != BLOCK_SIZE {
            bail!("short read from the capture ring");
        }
        process(&mut block)?;
    }

    Ok(())
}
