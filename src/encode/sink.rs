use std::path::PathBuf;

use crate::field::grid::IntensityField;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{VisarError, VisarResult};
use crate::render::pipeline::IntensityFrame;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Grid side length N of every frame.
    pub resolution: usize,
    /// Playback rate.
    pub fps: Fps,
    /// Number of frames that will be pushed.
    pub frames: u64,
}

/// What a sink produced once finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAnimation {
    /// Persisted artifact (file or directory), if the sink writes one.
    pub artifact: Option<PathBuf>,
    /// Frames written.
    pub frames: u64,
}

/// Consumer of rendered intensity frames (animation encoder).
///
/// Ordering contract: `push_frame` is called in strictly increasing [`FrameIndex`] order, only
/// after the whole batch rendered successfully.
pub trait FrameSink: Send {
    /// Check whether `cfg` can be encoded at all, before any frame is rendered.
    ///
    /// Must not create or modify the artifact. `begin` repeats the same checks.
    fn preflight(&self, cfg: &SinkConfig) -> VisarResult<()> {
        let _ = cfg;
        Ok(())
    }
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> VisarResult<()>;
    /// Push one frame in strictly increasing index order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &IntensityField) -> VisarResult<()>;
    /// Called once after the last frame is pushed.
    fn finalize(&mut self) -> VisarResult<EncodedAnimation>;
    /// Drop any partial artifact after a failure. Must be safe to call at any point.
    fn abort(&mut self) {}
}

/// Enforces the ordering and shape parts of the [`FrameSink`] contract.
#[derive(Debug, Default, Clone)]
pub(crate) struct FrameGate {
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    pushed: u64,
}

impl FrameGate {
    pub(crate) fn begin(&mut self, cfg: SinkConfig) -> VisarResult<()> {
        if cfg.resolution == 0 {
            return Err(VisarError::invalid_parameter(
                "sink resolution must be > 0",
            ));
        }
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.pushed = 0;
        Ok(())
    }

    pub(crate) fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub(crate) fn admit(&mut self, idx: FrameIndex, frame: &IntensityField) -> VisarResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| VisarError::encode("sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(VisarError::encode(format!(
                "sink received out-of-order frame {idx} after {last}"
            )));
        }
        if frame.resolution() != cfg.resolution {
            return Err(VisarError::encode(format!(
                "frame {idx} is {n}×{n}, sink expects {r}×{r}",
                n = frame.resolution(),
                r = cfg.resolution
            )));
        }
        self.last_idx = Some(idx);
        self.pushed += 1;
        Ok(())
    }

    pub(crate) fn finish(&mut self) -> VisarResult<u64> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| VisarError::encode("sink not started"))?;
        if self.pushed != cfg.frames {
            return Err(VisarError::encode(format!(
                "sink expected {} frames, received {}",
                cfg.frames, self.pushed
            )));
        }
        Ok(self.pushed)
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    gate: FrameGate,
    /// Frames in index order.
    pub(crate) frames: Vec<(FrameIndex, IntensityField)>,
    finalized: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, IntensityField)] {
        &self.frames
    }

    /// Whether `finalize` completed.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> VisarResult<()> {
        self.gate.begin(cfg)?;
        self.frames.clear();
        self.finalized = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &IntensityField) -> VisarResult<()> {
        self.gate.admit(idx, frame)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn finalize(&mut self) -> VisarResult<EncodedAnimation> {
        let frames = self.gate.finish()?;
        self.finalized = true;
        Ok(EncodedAnimation {
            artifact: None,
            frames,
        })
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.finalized = false;
    }
}

/// Hand a fully rendered batch to `sink`: `begin`, every frame in order, then `finalize`.
///
/// If the sink fails partway, `abort` is called so no truncated artifact is left behind.
pub fn write_animation(
    frames: &[IntensityFrame],
    fps: Fps,
    sink: &mut dyn FrameSink,
) -> VisarResult<EncodedAnimation> {
    let first = frames
        .first()
        .ok_or_else(|| VisarError::invalid_parameter("animation needs at least one frame"))?;
    let cfg = SinkConfig {
        resolution: first.intensity.resolution(),
        fps,
        frames: frames.len() as u64,
    };

    let result = (|| {
        sink.begin(cfg)?;
        for frame in frames {
            sink.push_frame(frame.index, &frame.intensity)?;
        }
        sink.finalize()
    })();

    if let Err(e) = &result {
        tracing::warn!(error = %e, "aborting sink after failure");
        sink.abort();
    }
    result
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
