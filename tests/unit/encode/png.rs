use super::*;
use crate::foundation::core::Fps;
use ndarray::Array2;

fn cfg(frames: u64) -> SinkConfig {
    SinkConfig {
        resolution: 4,
        fps: Fps::new(10, 1).unwrap(),
        frames,
    }
}

fn field(v: f64) -> IntensityField {
    IntensityField::new(Array2::from_elem((4, 4), v)).unwrap()
}

#[test]
fn writes_numbered_frames_and_reports_directory() {
    let dir = PathBuf::from("target").join("unit_png_sink").join("ok");
    let _ = std::fs::remove_dir_all(&dir);

    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(2)).unwrap();
    sink.push_frame(FrameIndex(0), &field(0.0)).unwrap();
    sink.push_frame(FrameIndex(1), &field(4.0)).unwrap();
    let out = sink.finalize().unwrap();

    assert_eq!(out.frames, 2);
    assert_eq!(out.artifact, Some(dir.clone()));
    assert!(dir.join("frame_00000.png").exists());
    assert!(dir.join("frame_00001.png").exists());
}

#[test]
fn abort_removes_partial_frames() {
    let dir = PathBuf::from("target").join("unit_png_sink").join("aborted");
    let _ = std::fs::remove_dir_all(&dir);

    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(3)).unwrap();
    sink.push_frame(FrameIndex(0), &field(1.0)).unwrap();
    assert!(sink.frame_path(FrameIndex(0)).exists());
    sink.abort();
    assert!(!sink.frame_path(FrameIndex(0)).exists());
}

#[test]
fn begin_clears_frames_from_a_longer_earlier_run() {
    let dir = PathBuf::from("target").join("unit_png_sink").join("rerun");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("notes.txt"), "keep").unwrap();

    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(6)).unwrap();
    for i in 0..6 {
        sink.push_frame(FrameIndex(i), &field(1.0)).unwrap();
    }
    assert_eq!(sink.finalize().unwrap().frames, 6);

    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(2)).unwrap();
    sink.push_frame(FrameIndex(0), &field(2.0)).unwrap();
    sink.push_frame(FrameIndex(1), &field(3.0)).unwrap();
    assert_eq!(sink.finalize().unwrap().frames, 2);

    let mut names: Vec<String> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["frame_00000.png", "frame_00001.png", "notes.txt"]);
}
