use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::field::grid::IntensityField;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{VisarError, VisarResult};
use crate::optics::doppler::DopplerConverter;
use crate::optics::interferometer::MachZehnder;
use crate::sequence::sequencer::{FrameSequence, VelocityFrame};

/// Worker pool controls for the frame-parallel stages.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    /// Fan frames out over a dedicated rayon pool when `true`.
    pub parallel: bool,
    /// Worker count. `None` sizes the pool to the available hardware parallelism.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
        }
    }
}

/// Counters for one render batch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderStats {
    /// Frames rendered.
    pub frames_total: u64,
    /// Samples rendered over all frames.
    pub samples_total: u64,
    /// Darkest sample seen.
    pub min_intensity: f64,
    /// Brightest sample seen.
    pub max_intensity: f64,
}

/// Intensity frame tagged with the index of the velocity frame it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct IntensityFrame {
    /// Simulated time index.
    pub index: FrameIndex,
    /// Observable fringe pattern.
    pub intensity: IntensityField,
}

/// Maps Doppler shift and interferometry over every frame of a sequence.
///
/// Workers share only the read-only optical parameters. Results are placed back into input
/// order before returning. A failure on any frame discards the whole batch and frames queued
/// behind it are never rendered.
#[derive(Clone, Debug)]
pub struct RenderPipeline {
    doppler: DopplerConverter,
    interferometer: MachZehnder,
    threading: RenderThreading,
}

impl RenderPipeline {
    /// Sequential pipeline over the given optics.
    pub fn new(doppler: DopplerConverter, interferometer: MachZehnder) -> Self {
        Self {
            doppler,
            interferometer,
            threading: RenderThreading::default(),
        }
    }

    /// Replace the threading configuration.
    pub fn with_threading(mut self, threading: RenderThreading) -> Self {
        self.threading = threading;
        self
    }

    /// Doppler stage.
    pub fn doppler(&self) -> &DopplerConverter {
        &self.doppler
    }

    /// Interferometer stage.
    pub fn interferometer(&self) -> &MachZehnder {
        &self.interferometer
    }

    /// Threading configuration.
    pub fn threading(&self) -> &RenderThreading {
        &self.threading
    }

    /// Render one frame on the calling thread. Domain errors carry the frame index.
    pub fn render_frame(&self, frame: &VelocityFrame) -> VisarResult<IntensityFrame> {
        let wavelengths = self
            .doppler
            .convert(&frame.velocity)
            .map_err(|e| e.with_frame(frame.index))?;
        let intensity = self
            .interferometer
            .transform(&wavelengths)
            .map_err(|e| e.with_frame(frame.index))?;
        Ok(IntensityFrame {
            index: frame.index,
            intensity,
        })
    }

    /// Render a whole sequence.
    pub fn render(
        &self,
        sequence: &FrameSequence,
    ) -> VisarResult<(Vec<IntensityFrame>, RenderStats)> {
        self.render_frames(sequence.frames())
    }

    /// Render frames and return them in input order.
    ///
    /// Completion order on the pool never affects output order. The first failing frame in input
    /// order is reported as [`VisarError::WorkerFailure`] and no partial output is returned.
    #[tracing::instrument(skip(self, frames), fields(
        frames = frames.len(),
        parallel = self.threading.parallel,
    ))]
    pub fn render_frames(
        &self,
        frames: &[VelocityFrame],
    ) -> VisarResult<(Vec<IntensityFrame>, RenderStats)> {
        if frames.is_empty() {
            return Err(VisarError::invalid_parameter(
                "render needs at least one frame",
            ));
        }

        let pool = if self.threading.parallel {
            Some(build_thread_pool(self.threading.threads)?)
        } else {
            None
        };
        let out = ordered_try_map(frames, pool.as_ref(), |frame| self.run_job(frame))?;

        let mut stats = RenderStats {
            min_intensity: f64::INFINITY,
            max_intensity: f64::NEG_INFINITY,
            ..RenderStats::default()
        };
        for frame in &out {
            let samples = frame.intensity.as_array();
            stats.frames_total += 1;
            stats.samples_total += samples.len() as u64;
            for &v in samples {
                stats.min_intensity = stats.min_intensity.min(v);
                stats.max_intensity = stats.max_intensity.max(v);
            }
        }

        tracing::debug!(
            frames = stats.frames_total,
            min = stats.min_intensity,
            max = stats.max_intensity,
            "render batch complete"
        );
        Ok((out, stats))
    }

    fn run_job(&self, frame: &VelocityFrame) -> VisarResult<IntensityFrame> {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.render_frame(frame)));
        let source = match outcome {
            Ok(Ok(rendered)) => return Ok(rendered),
            Ok(Err(e)) => e,
            Err(payload) => VisarError::Other(anyhow::anyhow!(
                "worker panicked: {}",
                panic_message(payload.as_ref())
            )),
        };
        Err(VisarError::WorkerFailure {
            frame: frame.index,
            source: Box::new(source),
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Map `job` over `items` on `pool` (or the calling thread) and return results in input order.
///
/// Once a slot fails, slots after it are not started. Slots before it still run, so the error
/// returned is the first failing slot in input order whatever the scheduling.
pub(crate) fn ordered_try_map<T, U, F>(
    items: &[T],
    pool: Option<&rayon::ThreadPool>,
    job: F,
) -> VisarResult<Vec<U>>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> VisarResult<U> + Sync,
{
    let Some(pool) = pool else {
        return items.iter().map(&job).collect();
    };

    let first_failed = AtomicUsize::new(usize::MAX);
    let slots: Vec<Option<VisarResult<U>>> = pool.install(|| {
        items
            .par_iter()
            .enumerate()
            .map(|(slot, item)| {
                if slot > first_failed.load(Ordering::Relaxed) {
                    return None;
                }
                let result = job(item);
                if result.is_err() {
                    first_failed.fetch_min(slot, Ordering::Relaxed);
                }
                Some(result)
            })
            .collect()
    });

    let mut out = Vec::with_capacity(items.len());
    for (slot, result) in slots.into_iter().enumerate() {
        // A skipped slot always sits behind a failed one, which returns first.
        let result = result.ok_or_else(|| {
            VisarError::Other(anyhow::anyhow!(
                "internal error: slot {slot} skipped without an earlier failure"
            ))
        })?;
        out.push(result?);
    }
    Ok(out)
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> VisarResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(VisarError::invalid_parameter(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        VisarError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
