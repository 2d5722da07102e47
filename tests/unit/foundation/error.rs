use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        VisarError::invalid_parameter("x")
            .to_string()
            .contains("invalid parameter:")
    );
    assert!(
        VisarError::domain(0, 0, "x")
            .to_string()
            .contains("domain error")
    );
    assert!(VisarError::encode("x").to_string().contains("encode error:"));
    assert!(
        VisarError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn domain_error_reports_frame_and_coordinate() {
    let err = VisarError::domain(3, 7, "beta >= 1").with_frame(FrameIndex(12));
    let msg = err.to_string();
    assert!(msg.contains("frame 12"), "{msg}");
    assert!(msg.contains("(3, 7)"), "{msg}");
    assert_eq!(err.frame(), Some(FrameIndex(12)));
}

#[test]
fn with_frame_leaves_other_variants_alone() {
    let err = VisarError::encode("boom").with_frame(FrameIndex(1));
    assert!(matches!(err, VisarError::Encode(_)));
    assert_eq!(err.frame(), None);
}

#[test]
fn worker_failure_names_frame_and_cause() {
    let err = VisarError::WorkerFailure {
        frame: FrameIndex(4),
        source: Box::new(VisarError::domain(0, 1, "wavelength must be > 0")),
    };
    let msg = err.to_string();
    assert!(msg.contains("frame 4"), "{msg}");
    assert!(msg.contains("wavelength"), "{msg}");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = VisarError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
