//! Mode-switched noise reduction engine.

use std::mem;

use quell_nr::anr::{AnrOutput, VariableLeakLms};
use quell_nr::config::BLOCK_SIZE;
use quell_nr::lms::NormalizedLms;
use quell_nr::smoothing::{ExponentialSmoother, MovingAverageSmoother};
use quell_nr::spectral::SpectralNoiseReducer;
use tracing::{debug, warn};

use crate::config::{Config, RuntimeSetting};
use crate::mode::{ModeCodeError, NrMode};

/// One queue slot per [`RuntimeSetting`] variant.
const PENDING_SETTINGS_CAPACITY: usize = 11;

/// Builder for [`NoiseReduction`].
#[derive(Debug, Default)]
pub struct NoiseReductionBuilder {
    config: Option<Config>,
}

impl NoiseReductionBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> NoiseReduction {
        NoiseReduction::new(self.config.unwrap_or_default())
    }
}

/// Noise reduction for one receive channel.
///
/// Owns the state of every algorithm; exactly one mode is active at a time
/// and its state is reset whenever it is (re)selected.
#[derive(Debug)]
pub struct NoiseReduction {
    config: Config,
    mode: NrMode,
    pending: Vec<RuntimeSetting>,
    lms: NormalizedLms,
    leaky: VariableLeakLms,
    notch: VariableLeakLms,
    kim: SpectralNoiseReducer,
    mmse: SpectralNoiseReducer,
    fnr: ExponentialSmoother,
    fnra: MovingAverageSmoother,
}

impl NoiseReduction {
    pub fn builder() -> NoiseReductionBuilder {
        NoiseReductionBuilder::default()
    }

    pub fn new(config: Config) -> Self {
        let mode = config.mode;
        let mut nr = Self {
            lms: NormalizedLms::new(config.lms.strength),
            config,
            mode,
            pending: Vec::with_capacity(PENDING_SETTINGS_CAPACITY),
            leaky: VariableLeakLms::new(AnrOutput::NoiseReduction),
            notch: VariableLeakLms::new(AnrOutput::Notch),
            kim: SpectralNoiseReducer::kim(),
            mmse: SpectralNoiseReducer::mmse(),
            fnr: ExponentialSmoother::default(),
            fnra: MovingAverageSmoother::default(),
        };
        nr.activate(mode);
        nr
    }

    /// Configuration as of the last processed block.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> NrMode {
        self.mode
    }

    /// Activates `mode`, resetting its state. Selecting the active mode
    /// again also resets it.
    pub fn select_mode(&mut self, mode: NrMode) {
        self.mode = mode;
        self.config.mode = mode;
        self.activate(mode);
    }

    /// Activates the mode with the given settings code. Unknown codes leave
    /// the active mode untouched.
    pub fn select_mode_code(&mut self, code: u8) -> Result<(), ModeCodeError> {
        match NrMode::try_from(code) {
            Ok(mode) => {
                self.select_mode(mode);
                Ok(())
            }
            Err(err) => {
                warn!(code, active = ?self.mode, "ignoring unknown noise reduction mode");
                Err(err)
            }
        }
    }

    /// Queues `setting` for the start of the next block. A later setting of
    /// the same kind replaces the queued one.
    pub fn set_runtime_setting(&mut self, setting: RuntimeSetting) {
        let kind = mem::discriminant(&setting);
        match self.pending.iter().position(|queued| mem::discriminant(queued) == kind) {
            Some(slot) => self.pending[slot] = setting,
            None => self.pending.push(setting),
        }
    }

    /// Processes one block in place.
    pub fn process_block(&mut self, block: &mut [f32; BLOCK_SIZE]) {
        self.apply_pending_settings();

        match self.mode {
            NrMode::Bypass => return,
            NrMode::Off => {}
            NrMode::Lms => self.lms.process(block),
            NrMode::Kim => self.kim.process(block, &self.config.spectral_params()),
            NrMode::Fnr => self.fnr.process(block, self.config.heuristic.fnr_level),
            NrMode::Fnra => self.fnra.process(block, self.config.heuristic.fnra_level),
            NrMode::Mmse => self.mmse.process(block, &self.config.spectral_params()),
            NrMode::LeakyLms => self.leaky.process(block, &self.config.anr),
        }

        if self.config.notch {
            self.notch.process(block, &self.config.anr);
        }
    }

    /// Processes `left` and mirrors the result into `right`. In bypass both
    /// channels are left untouched.
    pub fn process_stereo(&mut self, left: &mut [f32; BLOCK_SIZE], right: &mut [f32; BLOCK_SIZE]) {
        self.process_block(left);
        if self.mode != NrMode::Bypass {
            right.copy_from_slice(left);
        }
    }

    fn activate(&mut self, mode: NrMode) {
        match mode {
            NrMode::Bypass | NrMode::Off => {}
            NrMode::Lms => self.lms.reset(self.config.lms.strength),
            NrMode::Kim => self.kim.reset(),
            NrMode::Fnr => self.fnr.reset(),
            NrMode::Fnra => self.fnra.reset(),
            NrMode::Mmse => self.mmse.reset(),
            NrMode::LeakyLms => self.leaky.reset(),
        }
        debug!(?mode, code = mode.code(), "noise reduction mode activated");
    }

    fn apply_pending_settings(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut pending = mem::take(&mut self.pending);
        for setting in pending.drain(..) {
            let notch_was_enabled = self.config.notch;
            debug!(?setting, "applying runtime setting");
            if self.config.apply(setting) {
                self.lms.reset(self.config.lms.strength);
            }
            if self.config.notch && !notch_was_enabled {
                self.notch.reset();
            }
        }
        self.pending = pending;
    }
}

#[cfg(test)]
mod tests {
    use std::array;

    use quell_nr::lms::step_size;

    use super::*;
    use crate::config::{AnrParams, GainReference};

    fn noise_block(seed: &mut u32) -> [f32; BLOCK_SIZE] {
        array::from_fn(|_| {
            *seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            ((*seed >> 8) as f32 / (1u32 << 24) as f32 - 0.5) * 0.4
        })
    }

    fn run(nr: &mut NoiseReduction, seed: u32, blocks: usize) -> Vec<f32> {
        let mut seed = seed;
        let mut out = Vec::with_capacity(blocks * BLOCK_SIZE);
        for _ in 0..blocks {
            let mut block = noise_block(&mut seed);
            nr.process_block(&mut block);
            out.extend_from_slice(&block);
        }
        out
    }

    #[test]
    fn builder_uses_config_mode() {
        let nr = NoiseReduction::builder()
            .config(Config {
                mode: NrMode::Kim,
                ..Default::default()
            })
            .build();
        assert_eq!(nr.mode(), NrMode::Kim);
        assert_eq!(NoiseReduction::builder().build().mode(), NrMode::Mmse);
    }

    #[test]
    fn unknown_code_keeps_active_mode() {
        let mut nr = NoiseReduction::builder().build();
        nr.select_mode(NrMode::Lms);
        assert_eq!(nr.select_mode_code(8), Err(ModeCodeError { code: 8 }));
        assert_eq!(nr.mode(), NrMode::Lms);
        assert_eq!(nr.select_mode_code(3), Ok(()));
        assert_eq!(nr.mode(), NrMode::Kim);
        assert_eq!(nr.config().mode, NrMode::Kim);
    }

    #[test]
    fn reselecting_kim_matches_fresh_engine() {
        let config = Config {
            mode: NrMode::Kim,
            ..Default::default()
        };
        let mut reused = NoiseReduction::new(config.clone());
        run(&mut reused, 11, 20);
        reused.select_mode(NrMode::Mmse);
        run(&mut reused, 12, 5);
        reused.select_mode(NrMode::Kim);

        let mut fresh = NoiseReduction::new(config);
        assert_eq!(run(&mut reused, 99, 10), run(&mut fresh, 99, 10));
    }

    #[test]
    fn every_mode_resets_on_activation() {
        for mode in NrMode::ALL {
            let config = Config {
                mode,
                ..Default::default()
            };
            let mut reused = NoiseReduction::new(config.clone());
            run(&mut reused, 3, 8);
            reused.select_mode(mode);
            let mut fresh = NoiseReduction::new(config);
            assert_eq!(run(&mut reused, 4, 4), run(&mut fresh, 4, 4), "{mode:?}");
        }
    }

    #[test]
    fn settings_apply_at_next_block() {
        let mut nr = NoiseReduction::builder().build();
        nr.set_runtime_setting(RuntimeSetting::KimReference(GainReference::CurrentPower));
        nr.set_runtime_setting(RuntimeSetting::LmsStrength(12));
        assert_eq!(nr.config().kim.reference, GainReference::ShortTermAverage);
        let mut block = [0.0; BLOCK_SIZE];
        nr.process_block(&mut block);
        assert_eq!(nr.config().kim.reference, GainReference::CurrentPower);
        assert_eq!(nr.config().lms.strength, 12);
        assert_eq!(nr.lms.step_size(), step_size(12));
        assert!(nr.pending.is_empty());
    }

    #[test]
    fn repeated_settings_keep_the_latest_per_kind() {
        let mut nr = NoiseReduction::builder().build();
        for strength in 0..1_000 {
            nr.set_runtime_setting(RuntimeSetting::LmsStrength(strength % 21));
            nr.set_runtime_setting(RuntimeSetting::Notch(strength % 2 == 0));
        }
        nr.set_runtime_setting(RuntimeSetting::KimPsi(4.0));
        assert_eq!(nr.pending.len(), 3);

        let mut block = [0.0; BLOCK_SIZE];
        nr.process_block(&mut block);
        assert_eq!(nr.config().lms.strength, 999 % 21);
        assert!(!nr.config().notch);
        assert_eq!(nr.config().kim.psi, 4.0);
    }

    #[test]
    fn frozen_notch_is_transparent_in_off_mode() {
        let mut nr = NoiseReduction::builder()
            .config(Config {
                mode: NrMode::Off,
                notch: true,
                anr: AnrParams {
                    two_mu: 0.0,
                    ..Default::default()
                },
                ..Default::default()
            })
            .build();
        let mut seed = 5;
        let input = noise_block(&mut seed);
        let mut block = input;
        nr.process_block(&mut block);
        assert_eq!(block, input);
    }

    #[test]
    fn stereo_mirrors_left() {
        let mut nr = NoiseReduction::builder().build();
        nr.select_mode(NrMode::Fnr);
        let mut seed = 8;
        let mut left = noise_block(&mut seed);
        let mut right = [1.0; BLOCK_SIZE];
        nr.process_stereo(&mut left, &mut right);
        assert_eq!(left, right);
    }
}
