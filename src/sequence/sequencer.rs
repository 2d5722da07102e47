use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::field::generator::{
    ShapeParams, SyntheticFieldGenerator, validate_beam_width, validate_peak_speed,
};
use crate::field::grid::VelocityField;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{VisarError, VisarResult};
use crate::render::pipeline::{RenderThreading, build_thread_pool, ordered_try_map};

/// Beam width (fraction of N) of the first frame.
pub const DEFAULT_BASE_WIDTH: f64 = 0.5;
/// Beam width growth per frame.
pub const DEFAULT_WIDTH_RATE: f64 = 2.0e-4;

/// Parameters of a time-evolving shock front.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequenceParams {
    /// Grid side length N.
    pub resolution: usize,
    /// Plateau speed in m/s.
    pub peak_speed: f64,
    /// Number of frames T.
    pub timesteps: u64,
    /// Width `w₀` of frame 0.
    pub base_width: f64,
    /// Width change `Δw` per frame; negative values contract the beam.
    pub width_rate: f64,
}

impl SequenceParams {
    /// Parameters with the default width schedule.
    pub fn new(resolution: usize, peak_speed: f64, timesteps: u64) -> Self {
        Self {
            resolution,
            peak_speed,
            timesteps,
            base_width: DEFAULT_BASE_WIDTH,
            width_rate: DEFAULT_WIDTH_RATE,
        }
    }

    /// `w(t) = w₀ + t·Δw`.
    pub fn width_at(&self, idx: FrameIndex) -> f64 {
        self.base_width + idx.0 as f64 * self.width_rate
    }

    /// Reject anything that would fail partway through a sequence.
    pub fn validate(&self) -> VisarResult<()> {
        if self.resolution == 0 {
            return Err(VisarError::invalid_parameter("resolution must be > 0"));
        }
        if self.timesteps == 0 {
            return Err(VisarError::invalid_parameter("timesteps must be > 0"));
        }
        validate_peak_speed(self.peak_speed)?;
        if !self.base_width.is_finite() || !self.width_rate.is_finite() {
            return Err(VisarError::invalid_parameter(
                "base width and width rate must be finite",
            ));
        }
        // Width is linear in t, so checking both ends covers the whole range.
        let first = self.width_at(FrameIndex(0));
        let last = self.width_at(FrameIndex(self.timesteps - 1));
        if first <= 0.0 || last <= 0.0 {
            return Err(VisarError::invalid_parameter(format!(
                "beam width must stay > 0 over all {} frames (w(0) = {first}, w(T-1) = {last})",
                self.timesteps
            )));
        }
        validate_beam_width(first, self.resolution)?;
        validate_beam_width(last, self.resolution)?;
        Ok(())
    }
}

/// One generated frame.
#[derive(Clone, Debug, PartialEq)]
pub struct VelocityFrame {
    /// Simulated time index.
    pub index: FrameIndex,
    /// Velocity samples for this instant.
    pub velocity: VelocityField,
}

/// Immutable, index-ordered frames `0..T`.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSequence {
    frames: Vec<VelocityFrame>,
}

impl FrameSequence {
    /// Number of frames T.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false` for sequences built by the sequencer.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in index order.
    pub fn frames(&self) -> &[VelocityFrame] {
        &self.frames
    }

    /// Frame at `idx`, if inside the sequence.
    pub fn get(&self, idx: FrameIndex) -> Option<&VelocityFrame> {
        usize::try_from(idx.0).ok().and_then(|i| self.frames.get(i))
    }

    /// Iterate frames in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, VelocityFrame> {
        self.frames.iter()
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a VelocityFrame;
    type IntoIter = std::slice::Iter<'a, VelocityFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Drives [`SyntheticFieldGenerator`] across `T` time indices.
///
/// Frame `t` depends only on `(params, modulation, seed, t)`: the modulation phase comes from an
/// RNG seeded per index, never from shared state, so generating frames out of order or on many
/// threads yields the same sequence.
#[derive(Clone, Debug)]
pub struct TimeEvolutionSequencer {
    params: SequenceParams,
    generator: SyntheticFieldGenerator,
    seed: u64,
    threading: RenderThreading,
}

impl TimeEvolutionSequencer {
    /// Validate `params` and build a sequential sequencer.
    pub fn new(
        params: SequenceParams,
        generator: SyntheticFieldGenerator,
        seed: u64,
    ) -> VisarResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            generator,
            seed,
            threading: RenderThreading::default(),
        })
    }

    /// Generate frames on a dedicated pool when `threading.parallel` is set.
    pub fn with_threading(mut self, threading: RenderThreading) -> Self {
        self.threading = threading;
        self
    }

    /// Sequence parameters.
    pub fn params(&self) -> &SequenceParams {
        &self.params
    }

    /// Frame range `[0, T)`.
    pub fn range(&self) -> FrameRange {
        FrameRange::first(self.params.timesteps)
    }

    /// Modulation phase of frame `idx`, uniform in `[0, 2π)`.
    pub fn phase_at(&self, idx: FrameIndex) -> f64 {
        let mut rng = StdRng::seed_from_u64(self.seed ^ idx.0);
        rng.gen_range(0.0..TAU)
    }

    /// Generate the single frame `idx`.
    pub fn frame(&self, idx: FrameIndex) -> VisarResult<VelocityFrame> {
        if !self.range().contains(idx) {
            return Err(VisarError::invalid_parameter(format!(
                "frame {idx} outside sequence of {} frames",
                self.params.timesteps
            )));
        }
        let velocity = self.generator.generate(ShapeParams {
            resolution: self.params.resolution,
            peak_speed: self.params.peak_speed,
            width: self.params.width_at(idx),
            // A disabled modulation ignores the phase, so skip the draw.
            phase: if self.generator.modulation().is_enabled() {
                self.phase_at(idx)
            } else {
                0.0
            },
        })?;
        Ok(VelocityFrame {
            index: idx,
            velocity,
        })
    }

    /// Generate all `T` frames in index order.
    #[tracing::instrument(skip(self), fields(
        resolution = self.params.resolution,
        timesteps = self.params.timesteps,
        parallel = self.threading.parallel,
    ))]
    pub fn sequence(&self) -> VisarResult<FrameSequence> {
        let range = self.range();
        let indices: Vec<FrameIndex> = range.iter().collect();
        let pool = if self.threading.parallel {
            Some(build_thread_pool(self.threading.threads)?)
        } else {
            None
        };
        let frames = ordered_try_map(&indices, pool.as_ref(), |&idx| self.frame(idx))?;
        tracing::debug!(frames = range.len_frames(), "velocity sequence generated");
        Ok(FrameSequence { frames })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/sequencer.rs"]
mod tests;
