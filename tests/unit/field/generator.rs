use super::*;

fn params(resolution: usize, peak_speed: f64, width: f64, phase: f64) -> ShapeParams {
    ShapeParams {
        resolution,
        peak_speed,
        width,
        phase,
    }
}

#[test]
fn four_by_four_field_is_point_symmetric() {
    let field = SyntheticFieldGenerator::default()
        .generate(params(4, 10.0, 0.5, 0.0))
        .unwrap();
    let a = field.as_array();
    assert_eq!(a.dim(), (4, 4));
    for i in 0..4 {
        for j in 0..4 {
            assert_eq!(a[[i, j]], a[[3 - i, 3 - j]], "({i}, {j})");
        }
    }
}

#[test]
fn values_are_bounded_by_peak_speed() {
    let generator = SyntheticFieldGenerator::new(Modulation::Radial { depth: 0.4 }).unwrap();
    for n in [1usize, 2, 7, 32] {
        for width in [0.05, 0.25, 0.5, 2.0] {
            let field = generator.generate(params(n, 5.0e7, width, 1.3)).unwrap();
            assert_eq!(field.resolution(), n);
            for &v in field.as_array() {
                assert!(v >= 0.0);
                assert!(v <= 5.0e7 * (1.0 + 1e-12));
            }
        }
    }
}

#[test]
fn plateau_is_flat_and_edges_fall_off() {
    let field = SyntheticFieldGenerator::default()
        .generate(params(64, 1.0e6, 0.25, 0.0))
        .unwrap();
    let a = field.as_array();
    // r = 0.5 cells from the center: essentially at the plateau.
    assert!((a[[32, 32]] - 1.0e6).abs() < 1.0);
    // Corner is far outside the disk.
    assert!(a[[0, 0]] < 1.0);
}

#[test]
fn half_index_centering_peaks_on_sample() {
    let field = SyntheticFieldGenerator::default()
        .with_centering(GridCentering::HalfIndex)
        .generate(params(8, 3.0, 0.1, 0.0))
        .unwrap();
    assert_eq!(field.as_array()[[4, 4]], 3.0);
}

#[test]
fn disabled_modulation_ignores_phase() {
    let generator = SyntheticFieldGenerator::default();
    let a = generator.generate(params(16, 1.0e5, 0.3, 0.0)).unwrap();
    let b = generator.generate(params(16, 1.0e5, 0.3, 2.5)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn radial_modulation_depends_on_phase() {
    let generator = SyntheticFieldGenerator::new(Modulation::Radial { depth: 0.5 }).unwrap();
    let a = generator.generate(params(16, 1.0e5, 0.3, 0.0)).unwrap();
    let b = generator.generate(params(16, 1.0e5, 0.3, 1.0)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn invalid_parameters_are_rejected() {
    let generator = SyntheticFieldGenerator::default();
    for bad in [
        params(0, 1.0, 0.5, 0.0),
        params(4, 0.0, 0.5, 0.0),
        params(4, -1.0, 0.5, 0.0),
        params(4, SPEED_OF_LIGHT, 0.5, 0.0),
        params(4, 1.0, 0.0, 0.0),
        params(4, 1.0, 0.5, f64::NAN),
    ] {
        assert!(
            matches!(generator.generate(bad), Err(VisarError::InvalidParameter(_))),
            "{bad:?}"
        );
    }
    assert!(SyntheticFieldGenerator::new(Modulation::Radial { depth: 1.5 }).is_err());
}

#[test]
fn underflowing_width_is_rejected_as_parameter_error() {
    let generator = SyntheticFieldGenerator::default();
    for (n, width) in [(5usize, 1e-200), (4, 1e-170), (3, 1e200)] {
        assert!(
            matches!(
                generator.generate(params(n, 1.0e6, width, 0.0)),
                Err(VisarError::InvalidParameter(_))
            ),
            "n = {n}, width = {width}"
        );
    }
}
