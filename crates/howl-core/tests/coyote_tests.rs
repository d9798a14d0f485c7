// Quantisation and frame layout for the Coyote command link.

use howl_core::coyote::{
    frequency_to_device_units, CoyoteEncoder, DeviceParameters, StatusReport, PULSE_FRAME_LEN,
    STRENGTH_CHANGED,
};
use howl_core::{CodecError, Pulse};

fn pulse(freq_a: f32, amp_a: f32, freq_b: f32, amp_b: f32) -> Pulse {
    Pulse {
        freq_a,
        freq_b,
        amp_a,
        amp_b,
    }
}

fn sample_batch() -> [Pulse; 4] {
    [
        pulse(0.0, 0.5, 1.0, 1.3),
        pulse(1.0, 0.0, 0.0, 0.25),
        pulse(0.5, 0.75, 0.5, 0.1),
        pulse(1.0 / 9.0, -0.2, 2.0, 1.0),
    ]
}

#[test]
fn quantiser_matches_each_band() {
    // 5-100ms periods map one to one
    assert_eq!(frequency_to_device_units(200.0), 5);
    assert_eq!(frequency_to_device_units(100.0), 10);
    assert_eq!(frequency_to_device_units(50.0), 20);
    assert_eq!(frequency_to_device_units(10.0), 100);
    // 100-600ms compressed by 5
    assert_eq!(frequency_to_device_units(5.0), 120);
    assert_eq!(frequency_to_device_units(2.0), 180);
    // 600-1000ms compressed by 10
    assert_eq!(frequency_to_device_units(1000.0 / 600.0), 200);
    assert_eq!(frequency_to_device_units(1.25), 220);
    assert_eq!(frequency_to_device_units(1.0), 240);
}

#[test]
fn quantiser_is_continuous_at_band_seams() {
    for seam_period in [100.0_f64, 600.0] {
        let below = frequency_to_device_units(1000.0 / (seam_period - 1e-6));
        let above = frequency_to_device_units(1000.0 / (seam_period + 1e-6));
        let gap = (i32::from(below) - i32::from(above)).abs();
        assert!(gap <= 1, "seam at {seam_period}ms jumps by {gap}");
    }
}

#[test]
fn quantiser_stays_in_device_range() {
    for hz in 1..=500 {
        let value = frequency_to_device_units(f64::from(hz));
        assert!((5..=240).contains(&value), "{hz} Hz gave {value}");
    }
}

#[test]
fn pulse_frame_matches_hand_computed_bytes() {
    let mut encoder = CoyoteEncoder::new(10.0, 100.0);
    let frame = encoder.pulse_frame(20, 30, &sample_batch()).unwrap();
    let expected: [u8; PULSE_FRAME_LEN] = [
        0xB0, 0x1F, 20, 30, // header, strength flag, strengths
        100, 10, 18, 50, // A frequencies
        50, 0, 75, 0, // A intensities
        10, 100, 18, 10, // B frequencies
        100, 25, 10, 100, // B intensities
    ];
    assert_eq!(frame.as_slice(), &expected);
}

#[test]
fn strength_flag_only_set_on_change() {
    let mut encoder = CoyoteEncoder::new(10.0, 100.0);
    let batch = sample_batch();
    assert_eq!(encoder.pulse_frame(5, 5, &batch).unwrap()[1], STRENGTH_CHANGED);
    assert_eq!(encoder.pulse_frame(5, 5, &batch).unwrap()[1], 0x00);
    assert_eq!(encoder.pulse_frame(5, 6, &batch).unwrap()[1], STRENGTH_CHANGED);
    assert_eq!(encoder.last_strength(), (5, 6));
}

#[test]
fn swap_moves_whole_channel_blocks() {
    let batch = sample_batch();
    let straight = CoyoteEncoder::new(10.0, 100.0)
        .pulse_frame(1, 2, &batch)
        .unwrap();
    let mut swapping = CoyoteEncoder::new(10.0, 100.0);
    swapping.swap_channels = true;
    let swapped = swapping.pulse_frame(1, 2, &batch).unwrap();

    assert_eq!(&swapped[..4], &straight[..4]);
    assert_eq!(&swapped[4..12], &straight[12..20]);
    assert_eq!(&swapped[12..20], &straight[4..12]);
}

#[test]
fn wrong_batch_size_is_rejected() {
    let mut encoder = CoyoteEncoder::default();
    let short = [Pulse::ZERO; 3];
    assert_eq!(
        encoder.pulse_frame(0, 0, &short),
        Err(CodecError::BatchSize {
            expected: 4,
            actual: 3
        })
    );
}

#[test]
fn parameter_frame_defaults() {
    assert_eq!(
        DeviceParameters::default().to_frame(),
        [0xBF, 70, 70, 160, 160, 0, 0]
    );
}

#[test]
fn status_report_decodes_and_resets_reference() {
    let report = StatusReport::decode(&[0xB1, 0x00, 12, 34]).unwrap();
    assert_eq!(
        report,
        StatusReport {
            sequence: 0,
            strength_a: 12,
            strength_b: 34
        }
    );
    assert!(report.is_local_change());

    let mut encoder = CoyoteEncoder::default();
    encoder.acknowledge_status(&report);
    let frame = encoder.pulse_frame(12, 34, &[Pulse::ZERO; 4]).unwrap();
    assert_eq!(frame[1], 0x00);
}

#[test]
fn status_report_rejects_bad_input() {
    assert_eq!(
        StatusReport::decode(&[0xB0, 0, 0, 0]),
        Err(CodecError::BadHeader {
            expected: 0xB1,
            found: 0xB0
        })
    );
    assert_eq!(
        StatusReport::decode(&[0xB1, 0]),
        Err(CodecError::TooShort {
            needed: 4,
            actual: 2
        })
    );
    assert!(StatusReport::decode(&[]).is_err());
}
