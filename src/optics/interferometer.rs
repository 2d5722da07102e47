use std::f64::consts::TAU;

use ndarray::{Array2, ArrayView2};
use num_complex::Complex;

use crate::field::grid::{IntensityField, MAX_INTENSITY, WavelengthField};
use crate::foundation::error::{VisarError, VisarResult};

/// Two-beam Mach-Zehnder interferometer.
///
/// One arm crosses `path_length` metres of a medium with index `refractive_index`, the other is a
/// vacuum reference. The observable is the squared modulus of the unit-amplitude sum,
/// `I = |e^{iφ} - 1|²` with `φ = (n - 1)·2π·L/λ`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MachZehnder {
    refractive_index: f64,
    path_length: f64,
}

impl MachZehnder {
    /// Interferometer with the given delay medium.
    pub fn new(refractive_index: f64, path_length: f64) -> VisarResult<Self> {
        if !refractive_index.is_finite() || refractive_index <= 0.0 {
            return Err(VisarError::invalid_parameter(format!(
                "refractive index must be finite and > 0, got {refractive_index}"
            )));
        }
        if !path_length.is_finite() || path_length < 0.0 {
            return Err(VisarError::invalid_parameter(format!(
                "path length must be finite and >= 0, got {path_length}"
            )));
        }
        Ok(Self {
            refractive_index,
            path_length,
        })
    }

    /// Refractive index `n` of the delay arm.
    pub fn refractive_index(&self) -> f64 {
        self.refractive_index
    }

    /// Geometric length `L` of the delay arm in m.
    pub fn path_length(&self) -> f64 {
        self.path_length
    }

    /// Phase difference between the arms for wavelength `lambda`. `lambda` must be > 0.
    pub fn phase(&self, lambda: f64) -> f64 {
        (self.refractive_index - 1.0) * TAU * self.path_length / lambda
    }

    /// Intensity for an arbitrary wavelength grid.
    pub fn transform(&self, wavelengths: &WavelengthField) -> VisarResult<IntensityField> {
        self.transform_view(wavelengths.as_array().view())
    }

    /// Intensity for an unvalidated grid; non-positive wavelengths fail with their coordinate.
    pub fn transform_view(&self, wavelengths: ArrayView2<'_, f64>) -> VisarResult<IntensityField> {
        for ((row, col), &lambda) in wavelengths.indexed_iter() {
            if !lambda.is_finite() || lambda <= 0.0 {
                return Err(VisarError::domain(
                    row,
                    col,
                    format!("wavelength {lambda} must be finite and > 0, phase undefined"),
                ));
            }
            let phi = self.phase(lambda);
            if !phi.is_finite() {
                return Err(VisarError::domain(
                    row,
                    col,
                    format!("phase {phi} for wavelength {lambda} is not finite"),
                ));
            }
        }
        let out: Array2<f64> = wavelengths.mapv(|lambda| intensity_for_phase(self.phase(lambda)));
        Ok(IntensityField::from_array_unchecked(out))
    }
}

/// `|e^{iφ} - 1|²`, clamped to `[0, 4]` against rounding.
pub fn intensity_for_phase(phi: f64) -> f64 {
    let amplitude = Complex::from_polar(1.0, phi) - Complex::new(1.0, 0.0);
    amplitude.norm_sqr().clamp(0.0, MAX_INTENSITY)
}

#[cfg(test)]
#[path = "../../tests/unit/optics/interferometer.rs"]
mod tests;
