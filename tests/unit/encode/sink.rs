use super::*;
use ndarray::Array2;

fn field(n: usize, v: f64) -> IntensityField {
    IntensityField::new(Array2::from_elem((n, n), v)).unwrap()
}

fn frames(n: usize, count: u64) -> Vec<IntensityFrame> {
    (0..count)
        .map(|i| IntensityFrame {
            index: FrameIndex(i),
            intensity: field(n, i as f64 / count as f64),
        })
        .collect()
}

fn cfg(resolution: usize, frames: u64) -> SinkConfig {
    SinkConfig {
        resolution,
        fps: Fps::new(30, 1).unwrap(),
        frames,
    }
}

#[test]
fn write_animation_pushes_every_frame_in_order() {
    let mut sink = InMemorySink::new();
    let out = write_animation(&frames(2, 4), Fps::new(24, 1).unwrap(), &mut sink).unwrap();
    assert_eq!(out.frames, 4);
    assert_eq!(out.artifact, None);
    assert!(sink.is_finalized());
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2, 3]);
}

#[test]
fn out_of_order_and_duplicate_frames_are_rejected() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 3)).unwrap();
    sink.push_frame(FrameIndex(1), &field(2, 0.0)).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &field(2, 0.0)).is_err());
    assert!(sink.push_frame(FrameIndex(0), &field(2, 0.0)).is_err());
    sink.push_frame(FrameIndex(2), &field(2, 0.0)).unwrap();
}

#[test]
fn shape_mismatch_is_rejected() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 1)).unwrap();
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &field(3, 0.0)),
        Err(VisarError::Encode(_))
    ));
}

#[test]
fn push_before_begin_fails() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &field(2, 0.0)).is_err());
    assert!(sink.finalize().is_err());
}

#[test]
fn short_batch_fails_finalize() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &field(2, 0.0)).unwrap();
    assert!(sink.finalize().is_err());
}

#[derive(Default)]
struct FailingSink {
    inner: InMemorySink,
    fail_at: u64,
    aborted: bool,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, cfg: SinkConfig) -> VisarResult<()> {
        self.inner.begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &IntensityField) -> VisarResult<()> {
        if idx.0 == self.fail_at {
            return Err(VisarError::encode("disk full"));
        }
        self.inner.push_frame(idx, frame)
    }

    fn finalize(&mut self) -> VisarResult<EncodedAnimation> {
        self.inner.finalize()
    }

    fn abort(&mut self) {
        self.aborted = true;
        self.inner.abort();
    }
}

#[test]
fn sink_failure_triggers_abort() {
    let mut sink = FailingSink {
        fail_at: 2,
        ..FailingSink::default()
    };
    let err = write_animation(&frames(2, 4), Fps::new(30, 1).unwrap(), &mut sink).unwrap_err();
    assert!(err.to_string().contains("disk full"));
    assert!(sink.aborted);
    assert!(sink.inner.frames().is_empty());
}

#[test]
fn empty_animation_is_rejected() {
    let mut sink = InMemorySink::new();
    assert!(write_animation(&[], Fps::new(30, 1).unwrap(), &mut sink).is_err());
}
