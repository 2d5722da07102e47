use std::io::{BufWriter, Write as _};
use std::path::Path;

use anyhow::Context as _;
use ndarray::Array2;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::field::grid::VelocityField;
use crate::foundation::error::{VisarError, VisarResult};

/// Read a whitespace- or comma-delimited numeric grid, one row per line.
///
/// Blank lines and lines starting with `#` are skipped. Every row must have the same length.
pub fn load_grid(path: &Path) -> VisarResult<Array2<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read grid file '{}'", path.display()))?;
    parse_grid(&text).map_err(|e| match e {
        VisarError::InvalidParameter(msg) => {
            VisarError::invalid_parameter(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

/// Parse grid text in the format accepted by [`load_grid`].
pub fn parse_grid(text: &str) -> VisarResult<Array2<f64>> {
    let mut values = Vec::new();
    let mut cols: Option<usize> = None;
    let mut rows = 0usize;

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let before = values.len();
        for token in line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let v: f64 = token.parse().map_err(|_| {
                VisarError::invalid_parameter(format!(
                    "line {}: '{token}' is not a number",
                    lineno + 1
                ))
            })?;
            values.push(v);
        }
        let width = values.len() - before;
        match cols {
            None => cols = Some(width),
            Some(c) if c != width => {
                return Err(VisarError::invalid_parameter(format!(
                    "line {}: expected {c} values, found {width}",
                    lineno + 1
                )));
            }
            Some(_) => {}
        }
        rows += 1;
    }

    let cols = cols.ok_or_else(|| VisarError::invalid_parameter("grid file has no data rows"))?;
    Array2::from_shape_vec((rows, cols), values)
        .map_err(|e| VisarError::invalid_parameter(format!("grid shape: {e}")))
}

/// Write a grid with one row per line, values in scientific notation separated by spaces.
pub fn save_grid(path: &Path, grid: &Array2<f64>) -> VisarResult<()> {
    ensure_parent_dir(path)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("create grid file '{}'", path.display()))?;
    let mut w = BufWriter::new(file);
    for row in grid.rows() {
        let line = row
            .iter()
            .map(|v| format!("{v:.18e}"))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(w, "{line}").with_context(|| format!("write grid file '{}'", path.display()))?;
    }
    w.flush()
        .with_context(|| format!("flush grid file '{}'", path.display()))?;
    Ok(())
}

impl VelocityField {
    /// Load a velocity grid from disk and validate it as a [`VelocityField`].
    pub fn from_grid_file(path: &Path) -> VisarResult<Self> {
        VelocityField::new(load_grid(path)?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/io/grid_file.rs"]
mod tests;
