use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{EncodedAnimation, FrameGate, FrameSink, SinkConfig};
use crate::field::grid::IntensityField;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{VisarError, VisarResult};
use crate::render::raster::to_gray_rgba8;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams grey RGBA8 frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    gate: FrameGate,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            gate: FrameGate::default(),
        }
    }
}

impl FrameSink for FfmpegSink {
    fn preflight(&self, cfg: &SinkConfig) -> VisarResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(VisarError::invalid_parameter("fps must be non-zero"));
        }
        if cfg.resolution == 0 || !cfg.resolution.is_multiple_of(2) {
            return Err(VisarError::invalid_parameter(
                "ffmpeg sink resolution must be even and non-zero (required for yuv420p mp4 output)",
            ));
        }
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(VisarError::encode(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(VisarError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }
        Ok(())
    }

    fn begin(&mut self, cfg: SinkConfig) -> VisarResult<()> {
        self.preflight(&cfg)?;
        ensure_parent_dir(&self.opts.out_path)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{0}x{0}", cfg.resolution),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        // Output: h264 + yuv420p for broad compatibility.
        cmd.args([
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            VisarError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| VisarError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| VisarError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.gate.begin(cfg)?;
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &IntensityField) -> VisarResult<()> {
        self.gate.admit(idx, frame)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(VisarError::encode("ffmpeg sink is already finalized"));
        };

        let rgba = to_gray_rgba8(frame);
        use std::io::Write as _;
        stdin.write_all(&rgba.data).map_err(|e| {
            VisarError::encode(format!("failed to write frame {idx} to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn finalize(&mut self) -> VisarResult<EncodedAnimation> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| VisarError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| VisarError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| VisarError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| VisarError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(VisarError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let frames = self.gate.finish()?;
        Ok(EncodedAnimation {
            artifact: Some(self.opts.out_path.clone()),
            frames,
        })
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        if self.gate.config().is_some() {
            let _ = std::fs::remove_file(&self.opts.out_path);
        }
        self.gate = FrameGate::default();
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, use `-r` before `-i` to specify the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> VisarResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
