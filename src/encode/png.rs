use std::path::PathBuf;

use anyhow::Context as _;

use crate::encode::sink::{EncodedAnimation, FrameGate, FrameSink, SinkConfig};
use crate::field::grid::IntensityField;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::VisarResult;
use crate::render::raster::write_png;

/// Writes every frame as `frame_00000.png`, `frame_00001.png`, ... into a directory.
///
/// Useful when `ffmpeg` is unavailable; the directory is the artifact. Frame files from an
/// earlier run are removed on `begin`. Other files in the directory are left alone.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
    gate: FrameGate,
}

impl PngSequenceSink {
    /// Sink writing into `dir` (created on `begin`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
            gate: FrameGate::default(),
        }
    }

    /// File name used for frame `idx`.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:05}.png", idx.0))
    }

    /// Delete `frame_*.png` left by an earlier run, so the directory holds only this run's frames.
    fn remove_stale_frames(&self) -> VisarResult<()> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("list frame directory '{}'", self.dir.display()))?;
        for entry in entries {
            let entry = entry
                .with_context(|| format!("list frame directory '{}'", self.dir.display()))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !(name.starts_with("frame_") && name.ends_with(".png")) {
                continue;
            }
            let path = entry.path();
            if path.is_file() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("remove stale frame '{}'", path.display()))?;
                tracing::debug!(path = %path.display(), "removed stale frame");
            }
        }
        Ok(())
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> VisarResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create frame directory '{}'", self.dir.display()))?;
        self.gate.begin(cfg)?;
        self.written.clear();
        self.remove_stale_frames()
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &IntensityField) -> VisarResult<()> {
        self.gate.admit(idx, frame)?;
        let path = self.frame_path(idx);
        write_png(frame, &path)?;
        self.written.push(path);
        Ok(())
    }

    fn finalize(&mut self) -> VisarResult<EncodedAnimation> {
        let frames = self.gate.finish()?;
        self.written.clear();
        Ok(EncodedAnimation {
            artifact: Some(self.dir.clone()),
            frames,
        })
    }

    fn abort(&mut self) {
        for path in self.written.drain(..) {
            let _ = std::fs::remove_file(path);
        }
        self.gate = FrameGate::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
