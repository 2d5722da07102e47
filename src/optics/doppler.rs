use ndarray::{Array2, ArrayView2};

use crate::field::grid::{VelocityField, WavelengthField};
use crate::foundation::core::SPEED_OF_LIGHT;
use crate::foundation::error::{VisarError, VisarResult};

/// Relativistic Doppler shift of a probe laser reflected off moving material.
///
/// `λ(v) = λ₀ · sqrt((1 + β) / (1 - β))` with `β = v / c`. The exact form is used over the
/// whole speed range; `|β| >= 1` is a domain error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DopplerConverter {
    rest_wavelength: f64,
}

impl DopplerConverter {
    /// Converter for a laser of rest wavelength `rest_wavelength` (m).
    pub fn new(rest_wavelength: f64) -> VisarResult<Self> {
        if !rest_wavelength.is_finite() || rest_wavelength <= 0.0 {
            return Err(VisarError::invalid_parameter(format!(
                "rest wavelength must be finite and > 0, got {rest_wavelength}"
            )));
        }
        Ok(Self { rest_wavelength })
    }

    /// Unshifted wavelength λ₀ in m.
    pub fn rest_wavelength(&self) -> f64 {
        self.rest_wavelength
    }

    /// Shift a velocity grid elementwise. Shape is preserved.
    pub fn convert(&self, velocities: &VelocityField) -> VisarResult<WavelengthField> {
        self.convert_view(velocities.as_array().view())
    }

    /// Shift an unvalidated grid, e.g. one loaded from disk.
    ///
    /// The first sample with `|β| >= 1` (or a non-finite speed) fails with its coordinate.
    pub fn convert_view(&self, velocities: ArrayView2<'_, f64>) -> VisarResult<WavelengthField> {
        for ((row, col), &v) in velocities.indexed_iter() {
            check_beta(v).map_err(|reason| VisarError::domain(row, col, reason))?;
        }
        let lambda0 = self.rest_wavelength;
        let out: Array2<f64> = velocities.mapv(|v| shift_unchecked(lambda0, v));
        for ((row, col), &lambda) in out.indexed_iter() {
            check_shifted(lambda).map_err(|reason| VisarError::domain(row, col, reason))?;
        }
        Ok(WavelengthField::from_array_unchecked(out))
    }

    /// Shift a 1D series of speeds; errors report the sample position as the column.
    pub fn convert_samples(&self, velocities: &[f64]) -> VisarResult<Vec<f64>> {
        velocities
            .iter()
            .enumerate()
            .map(|(col, &v)| {
                check_beta(v).map_err(|reason| VisarError::domain(0, col, reason))?;
                let lambda = shift_unchecked(self.rest_wavelength, v);
                check_shifted(lambda).map_err(|reason| VisarError::domain(0, col, reason))?;
                Ok(lambda)
            })
            .collect()
    }
}

fn check_beta(v: f64) -> Result<(), String> {
    if !v.is_finite() {
        return Err(format!("velocity {v} is not finite"));
    }
    let beta = v / SPEED_OF_LIGHT;
    if beta.abs() >= 1.0 {
        return Err(format!(
            "|beta| = {} >= 1, Doppler shift undefined",
            beta.abs()
        ));
    }
    Ok(())
}

fn check_shifted(lambda: f64) -> Result<(), String> {
    if !lambda.is_finite() || lambda <= 0.0 {
        return Err(format!("shifted wavelength {lambda} is not a finite positive value"));
    }
    Ok(())
}

fn shift_unchecked(lambda0: f64, v: f64) -> f64 {
    let beta = v / SPEED_OF_LIGHT;
    lambda0 * ((1.0 + beta) / (1.0 - beta)).sqrt()
}

#[cfg(test)]
#[path = "../../tests/unit/optics/doppler.rs"]
mod tests;
