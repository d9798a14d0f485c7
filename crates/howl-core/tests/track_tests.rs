// Position-track pulse source.

use howl_core::{ControlTrack, PulseSource, SynthError, TrackSettings};

const EPS: f64 = 1e-9;

fn zigzag() -> ControlTrack {
    ControlTrack::new("zigzag", &[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)]).unwrap()
}

#[test]
fn interpolation_hits_every_point() {
    let track = zigzag();
    for (t, expected) in [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)] {
        let (position, _) = track.position_and_velocity(t);
        assert!((position - expected).abs() < EPS, "t={t}: {position}");
    }
}

#[test]
fn holds_end_positions_outside_the_table() {
    let track = zigzag();
    assert_eq!(track.position_and_velocity(-5.0), (0.0, 0.0));
    assert_eq!(track.position_and_velocity(10.0), (1.0, 0.0));
}

#[test]
fn extremes_start_and_end_at_rest() {
    let track = ControlTrack::new("ramp", &[(0.0, 0.0), (1.0, 0.5), (2.0, 1.0)]).unwrap();
    // first and last points have zero tangent, so the curve leaves them flat
    let (_, v_start) = track.position_and_velocity(1e-6);
    let (_, v_mid) = track.position_and_velocity(1.0);
    let (_, v_end) = track.position_and_velocity(2.0 - 1e-6);
    assert!(v_start.abs() < 1e-3, "start velocity {v_start}");
    assert!((v_mid - 0.5).abs() < EPS, "interior velocity {v_mid}");
    assert!(v_end.abs() < 1e-3, "end velocity {v_end}");
}

#[test]
fn flat_segment_is_silent() {
    let mut track = ControlTrack::new("flat", &[(0.0, 0.4), (2.0, 0.4)]).unwrap();
    let pulse = track.pulse_at_time(1.0);
    assert_eq!(pulse.amp_a, 0.0);
    assert_eq!(pulse.amp_b, 0.0);
}

#[test]
fn moving_track_drives_amplitude_and_frequency() {
    let mut track = zigzag();
    track.set_settings(TrackSettings {
        volume: 0.5,
        positional_effect_strength: 1.0,
        frequency_time_offset: 0.0,
        feel_exponent: 1.0,
    });
    let pulse = track.pulse_at_time(0.5);
    assert!(pulse.amp_a > 0.0 && pulse.amp_b > 0.0);
    assert!((pulse.freq_a - pulse.freq_b).abs() < 1e-6);
    assert!((f64::from(pulse.freq_b) - 0.5).abs() < 0.1);
}

#[test]
fn frequency_a_lags_by_the_offset() {
    let mut track = zigzag();
    track.set_settings(TrackSettings {
        frequency_time_offset: 1.0,
        ..TrackSettings::default()
    });
    // at t=2 the position is 0 but one second earlier it was 1
    let pulse = track.pulse_at_time(2.0);
    assert!(pulse.freq_a > 0.99, "freq_a {}", pulse.freq_a);
    assert!(pulse.freq_b < 0.01, "freq_b {}", pulse.freq_b);
}

#[test]
fn parses_two_column_tables() {
    let text = "# time position\n0 0\n0.5, 1\n\n1.0\t0.25\n";
    let track = ControlTrack::parse("table", text).unwrap();
    assert_eq!(track.len(), 3);
    assert_eq!(track.duration(), Some(1.0));
    assert!(track.is_finite());
    assert!(!track.should_loop());
    assert!(track.ready_to_play());
    assert_eq!(track.display_name(), "table");
}

#[test]
fn rejects_malformed_tables() {
    assert!(matches!(
        ControlTrack::parse("bad", "0 0\nzero one\n"),
        Err(SynthError::InvalidTrack(_))
    ));
    assert!(matches!(
        ControlTrack::parse("extra", "0 0 0\n"),
        Err(SynthError::InvalidTrack(_))
    ));
    assert!(ControlTrack::parse("empty", "# nothing\n").is_err());
    assert!(ControlTrack::new("nan", &[(f64::NAN, 0.0)]).is_err());
}

#[test]
fn positions_are_clamped_and_sorted() {
    let track = ControlTrack::new("messy", &[(2.0, 3.0), (0.0, -1.0)]).unwrap();
    assert_eq!(track.position_and_velocity(0.0).0, 0.0);
    assert_eq!(track.position_and_velocity(2.0).0, 1.0);
}
