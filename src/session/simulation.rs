use ndarray::ArrayView2;

use crate::config::SimulationConfig;
use crate::encode::sink::{EncodedAnimation, FrameSink, SinkConfig, write_animation};
use crate::field::generator::SyntheticFieldGenerator;
use crate::field::grid::{IntensityField, fingerprint_sequence};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{VisarError, VisarResult};
use crate::optics::doppler::DopplerConverter;
use crate::optics::interferometer::MachZehnder;
use crate::render::pipeline::{IntensityFrame, RenderPipeline, RenderStats};
use crate::sequence::sequencer::{FrameSequence, TimeEvolutionSequencer};

/// Outcome of [`Simulation::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    /// What the sink produced.
    pub animation: EncodedAnimation,
    /// Render counters.
    pub stats: RenderStats,
    /// Hash of every intensity frame in order. Equal configs give equal fingerprints.
    pub fingerprint: u64,
    /// Playback length of the animation in seconds.
    pub duration_secs: f64,
}

/// End-to-end driver: sequence, render, then hand the batch to a sink.
///
/// Construction validates the whole configuration, so nothing is computed for a bad config.
#[derive(Clone, Debug)]
pub struct Simulation {
    config: SimulationConfig,
    fps: Fps,
    sequencer: TimeEvolutionSequencer,
    pipeline: RenderPipeline,
}

impl Simulation {
    /// Validate `config` and wire up every stage.
    pub fn new(config: SimulationConfig) -> VisarResult<Self> {
        config.validate()?;
        let fps = config.fps()?;
        let generator =
            SyntheticFieldGenerator::new(config.modulation)?.with_centering(config.centering);
        let sequencer =
            TimeEvolutionSequencer::new(config.sequence_params(), generator, config.seed)?
                .with_threading(config.threading.clone());
        let doppler = DopplerConverter::new(config.rest_wavelength)?;
        let interferometer = MachZehnder::new(config.refractive_index, config.path_length)?;
        let pipeline =
            RenderPipeline::new(doppler, interferometer).with_threading(config.threading.clone());
        Ok(Self {
            config,
            fps,
            sequencer,
            pipeline,
        })
    }

    /// Configuration this simulation was built from.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Velocity stage.
    pub fn sequencer(&self) -> &TimeEvolutionSequencer {
        &self.sequencer
    }

    /// Optical stage.
    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// Generate all velocity frames.
    pub fn sequence(&self) -> VisarResult<FrameSequence> {
        self.sequencer.sequence()
    }

    /// Generate and render all frames, in index order.
    #[tracing::instrument(skip(self), fields(
        resolution = self.config.resolution,
        timesteps = self.config.timesteps,
    ))]
    pub fn render(&self) -> VisarResult<(Vec<IntensityFrame>, RenderStats)> {
        let sequence = self.sequence()?;
        self.pipeline.render(&sequence)
    }

    /// Generate and render frame `idx` alone. Matches frame `idx` of [`Simulation::render`].
    pub fn render_frame(&self, idx: FrameIndex) -> VisarResult<IntensityFrame> {
        let frame = self.sequencer.frame(idx)?;
        self.pipeline.render_frame(&frame)
    }

    /// Push a raw velocity grid (e.g. loaded from disk) through the optics.
    pub fn render_static_grid(
        &self,
        velocities: ArrayView2<'_, f64>,
    ) -> VisarResult<IntensityField> {
        let (rows, cols) = velocities.dim();
        if rows == 0 || rows != cols {
            return Err(VisarError::invalid_parameter(format!(
                "static grid must be a non-empty N×N grid, got {rows}×{cols}"
            )));
        }
        let wavelengths = self.pipeline.doppler().convert_view(velocities)?;
        self.pipeline.interferometer().transform(&wavelengths)
    }

    /// Render every frame, then write them to `sink`.
    ///
    /// The sink is asked to [`FrameSink::preflight`] the output shape first, so an unusable sink
    /// fails before any rendering. Otherwise the sink sees nothing unless all frames rendered.
    #[tracing::instrument(skip(self, sink))]
    pub fn run(&self, sink: &mut dyn FrameSink) -> VisarResult<RunReport> {
        sink.preflight(&SinkConfig {
            resolution: self.config.resolution,
            fps: self.fps,
            frames: self.config.timesteps,
        })?;
        let (frames, stats) = self.render()?;
        let fingerprint = fingerprint_sequence(frames.iter().map(|f| &f.intensity));
        let animation = write_animation(&frames, self.fps, sink)?;
        let duration_secs = self.fps.frames_to_secs(animation.frames);
        tracing::info!(
            frames = animation.frames,
            duration_secs,
            fingerprint = %format!("{fingerprint:016x}"),
            "animation written"
        );
        Ok(RunReport {
            animation,
            stats,
            fingerprint,
            duration_secs,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/simulation.rs"]
mod tests;
