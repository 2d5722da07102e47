use ndarray::Array2;

use crate::field::grid::VelocityField;
use crate::foundation::core::SPEED_OF_LIGHT;
use crate::foundation::error::{VisarError, VisarResult};

/// Super-Gaussian order of the beam profile. 1 would be an ordinary Gaussian.
pub const SUPER_GAUSSIAN_ORDER: i32 = 5;

/// Beam non-uniformity layered on top of the flat-top profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modulation {
    /// Identity factor; the field is the pure super-Gaussian.
    #[default]
    Disabled,
    /// Radial ripple `1 - depth·sin²(r/N + φ)`, `depth` in `[0, 1]`.
    Radial {
        /// Fractional dip at the ripple troughs.
        depth: f64,
    },
}

impl Modulation {
    /// Reject depths that would let the factor leave `[0, 1]`.
    pub fn validate(&self) -> VisarResult<()> {
        match *self {
            Modulation::Disabled => Ok(()),
            Modulation::Radial { depth } => {
                if !(0.0..=1.0).contains(&depth) {
                    return Err(VisarError::invalid_parameter(format!(
                        "modulation depth must be within [0, 1], got {depth}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Whether frames need a phase at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Modulation::Disabled)
    }

    /// Multiplicative factor at normalized radius `r_over_n` for beam phase `phase`.
    pub fn factor(&self, r_over_n: f64, phase: f64) -> f64 {
        match *self {
            Modulation::Disabled => 1.0,
            Modulation::Radial { depth } => {
                let s = (r_over_n + phase).sin();
                1.0 - depth * s * s
            }
        }
    }
}

/// Where the coordinate origin sits on the sample grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridCentering {
    /// `x = i - (N-1)/2`: the origin is the geometric grid center, so the field is symmetric
    /// under `(i, j) -> (N-1-i, N-1-j)`.
    #[default]
    CellCenter,
    /// `x = i - N/2`: the origin is sample `(N/2, N/2)`, half a cell off-center for even N.
    HalfIndex,
}

impl GridCentering {
    fn offset(self, n: usize) -> f64 {
        match self {
            GridCentering::CellCenter => (n as f64 - 1.0) / 2.0,
            GridCentering::HalfIndex => n as f64 / 2.0,
        }
    }
}

/// Shape parameters for one synthetic velocity field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeParams {
    /// Grid side length N.
    pub resolution: usize,
    /// Plateau speed `v_max` in m/s.
    pub peak_speed: f64,
    /// Beam width as a fraction of N.
    pub width: f64,
    /// Modulation phase in radians. Ignored when modulation is disabled.
    pub phase: f64,
}

impl ShapeParams {
    /// Check the parameters before any grid is allocated.
    pub fn validate(&self) -> VisarResult<()> {
        if self.resolution == 0 {
            return Err(VisarError::invalid_parameter("resolution must be > 0"));
        }
        validate_peak_speed(self.peak_speed)?;
        validate_beam_width(self.width, self.resolution)?;
        if !self.phase.is_finite() {
            return Err(VisarError::invalid_parameter("phase must be finite"));
        }
        Ok(())
    }
}

/// `2·(w·N)²`, the denominator of the super-Gaussian exponent.
fn beam_sigma2(width: f64, resolution: usize) -> f64 {
    2.0 * (width * resolution as f64).powi(2)
}

/// Widths so small that `2·(w·N)²` underflows to zero would turn the center sample into `0/0`.
pub(crate) fn validate_beam_width(width: f64, resolution: usize) -> VisarResult<()> {
    if !width.is_finite() || width <= 0.0 {
        return Err(VisarError::invalid_parameter(format!(
            "beam width must be finite and > 0, got {width}"
        )));
    }
    let sigma2 = beam_sigma2(width, resolution);
    if !sigma2.is_finite() || sigma2 <= 0.0 {
        return Err(VisarError::invalid_parameter(format!(
            "beam width {width} at resolution {resolution} gives a degenerate profile (2·(w·N)² = {sigma2})"
        )));
    }
    Ok(())
}

pub(crate) fn validate_peak_speed(peak_speed: f64) -> VisarResult<()> {
    if !peak_speed.is_finite() || peak_speed <= 0.0 {
        return Err(VisarError::invalid_parameter(format!(
            "peak speed must be finite and > 0, got {peak_speed}"
        )));
    }
    if peak_speed >= SPEED_OF_LIGHT {
        return Err(VisarError::invalid_parameter(format!(
            "peak speed {peak_speed} m/s must be below the speed of light"
        )));
    }
    Ok(())
}

/// Builds flat-top shock-disk velocity fields.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SyntheticFieldGenerator {
    modulation: Modulation,
    centering: GridCentering,
}

impl SyntheticFieldGenerator {
    /// Generator with the given modulation term.
    pub fn new(modulation: Modulation) -> VisarResult<Self> {
        modulation.validate()?;
        Ok(Self {
            modulation,
            centering: GridCentering::default(),
        })
    }

    /// Replace the grid centering convention.
    pub fn with_centering(mut self, centering: GridCentering) -> Self {
        self.centering = centering;
        self
    }

    /// Active modulation term.
    pub fn modulation(&self) -> Modulation {
        self.modulation
    }

    /// Build one N×N field.
    ///
    /// Cell `(i, j)` sits at `x = i - c`, `y = j - c` (`c` from [`GridCentering`]) and takes
    /// `v_max · exp(-((x² + y²) / (2·(w·N)²))^5)`, times the modulation factor.
    pub fn generate(&self, params: ShapeParams) -> VisarResult<VelocityField> {
        params.validate()?;

        let n = params.resolution;
        let n_f = n as f64;
        let center = self.centering.offset(n);
        let sigma2 = beam_sigma2(params.width, n);
        let v_max = params.peak_speed;
        let modulation = self.modulation;

        let grid = Array2::from_shape_fn((n, n), |(i, j)| {
            let x = i as f64 - center;
            let y = j as f64 - center;
            let r2 = x * x + y * y;
            let ideal = v_max * (-(r2 / sigma2).powi(SUPER_GAUSSIAN_ORDER)).exp();
            let factor = modulation.factor(r2.sqrt() / n_f, params.phase);
            (ideal * factor).abs()
        });

        VelocityField::new(grid)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/generator.rs"]
mod tests;
