//! Synthetic VISAR (velocity interferometer system for any reflector) simulation.
//!
//! A time-evolving, super-Gaussian shock-front velocity field is Doppler shifted, passed through
//! a Mach-Zehnder delay interferometer, and the resulting fringe intensity is written out as an
//! animation:
//!
//! - Build a [`SimulationConfig`] (JSON or code) and a [`Simulation`]
//! - Render single frames, or the whole sequence into a [`FrameSink`]
//! - Every frame depends only on `(config, t)`, so parallel and sequential runs agree bit for bit
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod config;
/// Animation sinks: in-memory, PNG sequence, and ffmpeg MP4.
pub mod encode;
pub(crate) mod field;
pub(crate) mod io;
pub(crate) mod optics;
pub(crate) mod render;
pub(crate) mod sequence;
pub(crate) mod session;

pub use crate::foundation::core::{Fps, FrameIndex, FrameRange, SPEED_OF_LIGHT};
pub use crate::foundation::error::{VisarError, VisarResult};

pub use crate::config::SimulationConfig;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::png::PngSequenceSink;
pub use crate::encode::sink::{
    EncodedAnimation, FrameSink, InMemorySink, SinkConfig, write_animation,
};
pub use crate::field::generator::{
    GridCentering, Modulation, SUPER_GAUSSIAN_ORDER, ShapeParams, SyntheticFieldGenerator,
};
pub use crate::field::grid::{
    IntensityField, MAX_INTENSITY, VelocityField, WavelengthField, fingerprint_sequence,
};
pub use crate::io::grid_file::{load_grid, parse_grid, save_grid};
pub use crate::optics::doppler::DopplerConverter;
pub use crate::optics::interferometer::{MachZehnder, intensity_for_phase};
pub use crate::render::pipeline::{IntensityFrame, RenderPipeline, RenderStats, RenderThreading};
pub use crate::render::raster::{FrameRGBA, to_gray_rgba8, write_png};
pub use crate::sequence::sequencer::{
    DEFAULT_BASE_WIDTH, DEFAULT_WIDTH_RATE, FrameSequence, SequenceParams,
    TimeEvolutionSequencer, VelocityFrame,
};
pub use crate::session::simulation::{RunReport, Simulation};
