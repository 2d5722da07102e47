use std::path::Path;

use anyhow::Context as _;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::field::grid::{IntensityField, MAX_INTENSITY};
use crate::foundation::error::VisarResult;
use crate::foundation::math::unit_range_to_u8;

/// An intensity frame rasterized to opaque RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

/// Grey-scale rasterization: `0` maps to black, `4` to white.
///
/// Grid row `i` becomes image row `y = i`, column `j` becomes `x = j`.
pub fn to_gray_rgba8(field: &IntensityField) -> FrameRGBA {
    let samples = field.as_array();
    let (rows, cols) = samples.dim();
    let mut data = Vec::with_capacity(rows * cols * 4);
    for &v in samples {
        let g = unit_range_to_u8(v, 0.0, MAX_INTENSITY);
        data.extend_from_slice(&[g, g, g, 255]);
    }
    FrameRGBA {
        width: cols as u32,
        height: rows as u32,
        data,
    }
}

/// Write a single intensity frame as a PNG (the static snapshot artifact).
pub fn write_png(field: &IntensityField, path: &Path) -> VisarResult<()> {
    let frame = to_gray_rgba8(field);
    write_rgba_png(&frame, path)
}

pub(crate) fn write_rgba_png(frame: &FrameRGBA, path: &Path) -> VisarResult<()> {
    ensure_parent_dir(path)?;
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
