use std::path::Path;

use anyhow::Context as _;

use crate::field::generator::{GridCentering, Modulation, validate_peak_speed};
use crate::foundation::core::Fps;
use crate::foundation::error::{VisarError, VisarResult};
use crate::render::pipeline::RenderThreading;
use crate::sequence::sequencer::{DEFAULT_BASE_WIDTH, DEFAULT_WIDTH_RATE, SequenceParams};

/// Every knob of an animation build, loadable from JSON.
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Grid side length N.
    pub resolution: usize,
    /// Plateau speed in m/s.
    pub peak_speed: f64,
    /// Number of frames T.
    pub timesteps: u64,
    /// Beam width of frame 0 as a fraction of N.
    pub base_width: f64,
    /// Beam width change per frame.
    pub width_rate: f64,
    /// Beam non-uniformity term.
    pub modulation: Modulation,
    /// Coordinate origin convention.
    pub centering: GridCentering,
    /// Seed of the per-frame phase generator.
    pub seed: u64,
    /// Probe laser wavelength in m.
    pub rest_wavelength: f64,
    /// Refractive index of the delay arm.
    pub refractive_index: f64,
    /// Length of the delay arm in m.
    pub path_length: f64,
    /// Playback rate of the encoded animation.
    pub fps: u32,
    /// Worker pool controls for sequencing and rendering.
    pub threading: RenderThreading,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            resolution: 256,
            peak_speed: 5.0e7,
            timesteps: 400,
            base_width: DEFAULT_BASE_WIDTH,
            width_rate: DEFAULT_WIDTH_RATE,
            modulation: Modulation::Disabled,
            centering: GridCentering::CellCenter,
            seed: 0,
            rest_wavelength: 550e-9,
            refractive_index: 1.5,
            path_length: 1.0e-3,
            fps: 30,
            threading: RenderThreading {
                parallel: true,
                threads: None,
            },
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> VisarResult<Self> {
        serde_json::from_str(text).map_err(|e| VisarError::serde(e.to_string()))
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_path(path: &Path) -> VisarResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Serialize as pretty JSON.
    pub fn to_json_pretty(&self) -> VisarResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| VisarError::serde(e.to_string()))
    }

    /// Sequencer view of the configuration.
    pub fn sequence_params(&self) -> SequenceParams {
        SequenceParams {
            resolution: self.resolution,
            peak_speed: self.peak_speed,
            timesteps: self.timesteps,
            base_width: self.base_width,
            width_rate: self.width_rate,
        }
    }

    /// Playback rate as a validated [`Fps`].
    pub fn fps(&self) -> VisarResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Reject invalid values before any computation begins.
    pub fn validate(&self) -> VisarResult<()> {
        self.sequence_params().validate()?;
        validate_peak_speed(self.peak_speed)?;
        self.modulation.validate()?;
        if !self.rest_wavelength.is_finite() || self.rest_wavelength <= 0.0 {
            return Err(VisarError::invalid_parameter(
                "rest_wavelength must be finite and > 0",
            ));
        }
        if !self.refractive_index.is_finite() || self.refractive_index <= 0.0 {
            return Err(VisarError::invalid_parameter(
                "refractive_index must be finite and > 0",
            ));
        }
        if !self.path_length.is_finite() || self.path_length < 0.0 {
            return Err(VisarError::invalid_parameter(
                "path_length must be finite and >= 0",
            ));
        }
        self.fps()?;
        if self.threading.threads == Some(0) {
            return Err(VisarError::invalid_parameter(
                "threading.threads must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
