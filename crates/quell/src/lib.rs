//! Receive-audio noise reduction for software-defined radios.
//!
//! Audio arrives in blocks of [`BLOCK_SIZE`] samples at [`SAMPLE_RATE_HZ`].
//! One of eight modes is active at a time: bypass, off, normalized LMS,
//! Kim & Ruwisch spectral subtraction, two heuristic smoothers, MMSE and a
//! variable-leak LMS predictor. An automatic notch can follow any mode but
//! bypass.
//!
//! # Quick Start
//!
//! ```
//! use quell::{Config, NoiseReduction, NrMode, RuntimeSetting, BLOCK_SIZE};
//!
//! let config = Config {
//!     mode: NrMode::Kim,
//!     ..Default::default()
//! };
//! let mut nr = NoiseReduction::builder().config(config).build();
//!
//! let mut block = [0.0f32; BLOCK_SIZE];
//! nr.process_block(&mut block);
//!
//! // Changes are picked up at the start of the next block.
//! nr.set_runtime_setting(RuntimeSetting::Notch(true));
//! nr.process_block(&mut block);
//! assert!(nr.config().notch);
//! ```

pub mod config;
mod filter_bank;
mod mode;
mod noise_reduction;

// Public re-exports.
pub use config::{Config, RuntimeSetting};
pub use filter_bank::{FIR_SAMPLE_RATE_HZ, FilterBank, FilterEditError, FilterPreset, PRESET_TAPS};
pub use mode::{ModeCodeError, NrMode};
pub use noise_reduction::{NoiseReduction, NoiseReductionBuilder};
pub use quell_nr::config::{BLOCK_SIZE, SAMPLE_RATE_HZ};
