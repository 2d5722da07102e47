use ndarray::Array2;

use crate::foundation::core::SPEED_OF_LIGHT;
use crate::foundation::error::{VisarError, VisarResult};
use crate::foundation::math::Fnv1a64;

/// Inclusive upper bound of a unit-amplitude two-beam interference intensity.
pub const MAX_INTENSITY: f64 = 4.0;

/// N×N grid of material speeds in m/s.
///
/// Every sample is finite, non-negative and strictly below [`SPEED_OF_LIGHT`].
#[derive(Clone, Debug, PartialEq)]
pub struct VelocityField(Array2<f64>);

/// N×N grid of Doppler-shifted wavelengths in m, every sample finite and positive.
#[derive(Clone, Debug, PartialEq)]
pub struct WavelengthField(Array2<f64>);

/// N×N grid of interference intensities in `[0, 4]`.
#[derive(Clone, Debug, PartialEq)]
pub struct IntensityField(Array2<f64>);

fn ensure_square(data: &Array2<f64>, what: &str) -> VisarResult<usize> {
    let (rows, cols) = data.dim();
    if rows == 0 || rows != cols {
        return Err(VisarError::invalid_parameter(format!(
            "{what} must be a non-empty N×N grid, got {rows}×{cols}"
        )));
    }
    Ok(rows)
}

fn first_violation(
    data: &Array2<f64>,
    bad: impl Fn(f64) -> Option<String>,
) -> VisarResult<()> {
    for ((row, col), &v) in data.indexed_iter() {
        if let Some(reason) = bad(v) {
            return Err(VisarError::domain(row, col, reason));
        }
    }
    Ok(())
}

impl VelocityField {
    /// Wrap a velocity grid, validating shape and every sample.
    ///
    /// A sample at or above light speed is a [`VisarError::Domain`]; it is never clamped.
    pub fn new(data: Array2<f64>) -> VisarResult<Self> {
        ensure_square(&data, "velocity field")?;
        first_violation(&data, |v| {
            if !v.is_finite() || v < 0.0 {
                Some(format!("velocity {v} must be finite and non-negative"))
            } else if v >= SPEED_OF_LIGHT {
                Some(format!(
                    "velocity {v} m/s is not below the speed of light ({SPEED_OF_LIGHT} m/s)"
                ))
            } else {
                None
            }
        })?;
        Ok(Self(data))
    }

    /// Grid side length N.
    pub fn resolution(&self) -> usize {
        self.0.nrows()
    }

    /// Borrow the underlying samples.
    pub fn as_array(&self) -> &Array2<f64> {
        &self.0
    }

    /// Take ownership of the underlying samples.
    pub fn into_array(self) -> Array2<f64> {
        self.0
    }

    /// Largest sample in the grid.
    pub fn max_speed(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }
}

impl WavelengthField {
    /// Wrap a wavelength grid, validating shape and positivity.
    pub fn new(data: Array2<f64>) -> VisarResult<Self> {
        ensure_square(&data, "wavelength field")?;
        first_violation(&data, |v| {
            (!v.is_finite() || v <= 0.0)
                .then(|| format!("wavelength {v} must be finite and > 0"))
        })?;
        Ok(Self(data))
    }

    pub(crate) fn from_array_unchecked(data: Array2<f64>) -> Self {
        Self(data)
    }

    /// Grid side length N.
    pub fn resolution(&self) -> usize {
        self.0.nrows()
    }

    /// Borrow the underlying samples.
    pub fn as_array(&self) -> &Array2<f64> {
        &self.0
    }

    /// Take ownership of the underlying samples.
    pub fn into_array(self) -> Array2<f64> {
        self.0
    }
}

impl IntensityField {
    /// Wrap an intensity grid, validating shape and the `[0, 4]` range.
    pub fn new(data: Array2<f64>) -> VisarResult<Self> {
        ensure_square(&data, "intensity field")?;
        first_violation(&data, |v| {
            (!(0.0..=MAX_INTENSITY).contains(&v))
                .then(|| format!("intensity {v} outside [0, {MAX_INTENSITY}]"))
        })?;
        Ok(Self(data))
    }

    pub(crate) fn from_array_unchecked(data: Array2<f64>) -> Self {
        Self(data)
    }

    /// Grid side length N.
    pub fn resolution(&self) -> usize {
        self.0.nrows()
    }

    /// Borrow the underlying samples.
    pub fn as_array(&self) -> &Array2<f64> {
        &self.0
    }

    /// Take ownership of the underlying samples.
    pub fn into_array(self) -> Array2<f64> {
        self.0
    }

    /// Bit-exact content hash (shape plus the IEEE-754 bits of every sample, row-major).
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        let (rows, cols) = self.0.dim();
        h.write_u64(rows as u64);
        h.write_u64(cols as u64);
        for &v in &self.0 {
            h.write_f64(v);
        }
        h.finish()
    }
}

/// Order-sensitive hash over a whole rendered sequence.
pub fn fingerprint_sequence<'a>(frames: impl IntoIterator<Item = &'a IntensityField>) -> u64 {
    let mut h = Fnv1a64::new_default();
    let mut count = 0u64;
    for frame in frames {
        h.write_u64(frame.fingerprint());
        count += 1;
    }
    h.write_u64(count);
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/field/grid.rs"]
mod tests;
