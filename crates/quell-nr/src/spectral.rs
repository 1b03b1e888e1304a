//! Spectral noise reducers: a frame engine paired with a gain estimator.

use tracing::debug;

use crate::band::BinRange;
use crate::config::{BLOCK_SIZE, SpectralParams};
use crate::frame_engine::{FrameEngine, FrameWindow};
use crate::kim::KimEstimator;
use crate::mmse::MmseEstimator;

/// Lifecycle of a spectral estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectralPhase {
    /// Freshly reset; no frame seen yet.
    Uninitialized,
    /// Building the initial noise estimate.
    Warming,
    /// Regular per-frame gain computation.
    Steady,
}

/// Gain estimator driving a [`SpectralNoiseReducer`].
#[derive(Debug)]
pub enum GainStage {
    Kim(KimEstimator),
    Mmse(MmseEstimator),
}

impl GainStage {
    fn window(&self) -> FrameWindow {
        match self {
            Self::Kim(_) => FrameWindow::Hann,
            Self::Mmse(_) => FrameWindow::SqrtHann,
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Kim(kim) => kim.reset(),
            Self::Mmse(mmse) => mmse.reset(),
        }
    }

    pub fn phase(&self) -> SpectralPhase {
        match self {
            Self::Kim(kim) => kim.phase(),
            Self::Mmse(mmse) => mmse.phase(),
        }
    }
}

#[derive(Debug)]
pub struct SpectralNoiseReducer {
    frames: FrameEngine,
    stage: GainStage,
}

impl SpectralNoiseReducer {
    pub fn new(stage: GainStage) -> Self {
        Self {
            frames: FrameEngine::new(stage.window()),
            stage,
        }
    }

    pub fn kim() -> Self {
        Self::new(GainStage::Kim(KimEstimator::default()))
    }

    pub fn mmse() -> Self {
        Self::new(GainStage::Mmse(MmseEstimator::default()))
    }

    pub fn stage(&self) -> &GainStage {
        &self.stage
    }

    pub fn phase(&self) -> SpectralPhase {
        self.stage.phase()
    }

    /// Returns the estimator and the overlap buffers to their initial state.
    pub fn reset(&mut self) {
        self.frames.reset();
        self.stage.reset();
        debug!(window = ?self.frames.window(), "spectral noise reducer reset");
    }

    pub fn process(&mut self, block: &mut [f32; BLOCK_SIZE], params: &SpectralParams) {
        let band = BinRange::from_band(&params.band);
        let stage = &mut self.stage;
        self.frames.process(block, |power, gains| match stage {
            GainStage::Kim(kim) => kim.update(power, gains, &params.kim, &params.smoothing, band),
            GainStage::Mmse(mmse) => mmse.update(power, gains, &params.smoothing, band),
        });
    }
}
