use super::*;
use crate::field::generator::Modulation;

fn sequencer(timesteps: u64, modulation: Modulation, seed: u64) -> TimeEvolutionSequencer {
    TimeEvolutionSequencer::new(
        SequenceParams::new(12, 2.0e7, timesteps),
        SyntheticFieldGenerator::new(modulation).unwrap(),
        seed,
    )
    .unwrap()
}

#[test]
fn produces_t_frames_in_index_order() {
    let seq = sequencer(5, Modulation::Disabled, 0).sequence().unwrap();
    assert_eq!(seq.len(), 5);
    for (i, frame) in seq.iter().enumerate() {
        assert_eq!(frame.index, FrameIndex(i as u64));
        assert_eq!(frame.velocity.resolution(), 12);
    }
    assert!(seq.get(FrameIndex(5)).is_none());
}

#[test]
fn width_schedule_is_linear_in_index() {
    let p = SequenceParams {
        resolution: 4,
        peak_speed: 1.0,
        timesteps: 10,
        base_width: 0.3,
        width_rate: 0.01,
    };
    assert_eq!(p.width_at(FrameIndex(0)), 0.3);
    assert!((p.width_at(FrameIndex(7)) - 0.37).abs() < 1e-15);
}

#[test]
fn expanding_beam_covers_more_area_over_time() {
    let p = SequenceParams {
        resolution: 32,
        peak_speed: 1.0e6,
        timesteps: 3,
        base_width: 0.1,
        width_rate: 0.1,
    };
    let s = TimeEvolutionSequencer::new(p, SyntheticFieldGenerator::default(), 0).unwrap();
    let seq = s.sequence().unwrap();
    let mass = |f: &VelocityFrame| f.velocity.as_array().sum();
    assert!(mass(&seq.frames()[0]) < mass(&seq.frames()[1]));
    assert!(mass(&seq.frames()[1]) < mass(&seq.frames()[2]));
}

#[test]
fn phase_depends_only_on_seed_and_index() {
    let a = sequencer(8, Modulation::Radial { depth: 0.3 }, 42);
    let b = sequencer(8, Modulation::Radial { depth: 0.3 }, 42);
    let c = sequencer(8, Modulation::Radial { depth: 0.3 }, 43);
    for t in 0..8 {
        let phi = a.phase_at(FrameIndex(t));
        assert!((0.0..TAU).contains(&phi));
        assert_eq!(phi, b.phase_at(FrameIndex(t)));
    }
    assert_ne!(a.phase_at(FrameIndex(0)), a.phase_at(FrameIndex(1)));
    assert_ne!(a.phase_at(FrameIndex(3)), c.phase_at(FrameIndex(3)));
}

#[test]
fn parallel_generation_matches_sequential() {
    let seq = sequencer(9, Modulation::Radial { depth: 0.5 }, 7);
    let par = seq.clone().with_threading(RenderThreading {
        parallel: true,
        threads: Some(4),
    });
    assert_eq!(seq.sequence().unwrap(), par.sequence().unwrap());
}

#[test]
fn single_frame_matches_sequence_entry() {
    let s = sequencer(6, Modulation::Radial { depth: 0.2 }, 3);
    let seq = s.sequence().unwrap();
    assert_eq!(&s.frame(FrameIndex(4)).unwrap(), seq.get(FrameIndex(4)).unwrap());
    assert!(s.frame(FrameIndex(6)).is_err());
}

#[test]
fn invalid_parameters_fail_before_generation() {
    let generator = SyntheticFieldGenerator::default();
    for p in [
        SequenceParams::new(0, 1.0, 4),
        SequenceParams::new(4, 1.0, 0),
        SequenceParams::new(4, 0.0, 4),
        SequenceParams {
            base_width: 0.01,
            width_rate: -0.01,
            ..SequenceParams::new(4, 1.0, 4)
        },
    ] {
        assert!(matches!(
            TimeEvolutionSequencer::new(p, generator, 0),
            Err(VisarError::InvalidParameter(_))
        ));
    }
}

#[test]
fn disabled_modulation_ignores_seed() {
    let a = sequencer(3, Modulation::Disabled, 1).sequence().unwrap();
    let b = sequencer(3, Modulation::Disabled, 99).sequence().unwrap();
    assert_eq!(a, b);

    let s = sequencer(3, Modulation::Disabled, 7);
    let direct = SyntheticFieldGenerator::new(Modulation::Disabled)
        .unwrap()
        .generate(ShapeParams {
            resolution: 12,
            peak_speed: 2.0e7,
            width: s.params().width_at(FrameIndex(1)),
            phase: 0.0,
        })
        .unwrap();
    assert_eq!(s.frame(FrameIndex(1)).unwrap().velocity, direct);
}

#[test]
fn end_widths_that_underflow_or_overflow_are_rejected() {
    let tiny = SequenceParams {
        resolution: 5,
        peak_speed: 1.0e7,
        timesteps: 4,
        base_width: 1.0e-200,
        width_rate: 0.0,
    };
    assert!(matches!(
        tiny.validate(),
        Err(VisarError::InvalidParameter(_))
    ));

    let runaway = SequenceParams {
        base_width: 0.1,
        width_rate: 1.0e200,
        ..tiny
    };
    assert!(matches!(
        runaway.validate(),
        Err(VisarError::InvalidParameter(_))
    ));
}
