// Settings loading and validation.

use std::io::Write;

use howl::{ConfigError, Settings};

#[test]
fn full_document_round_trips_through_toml() {
    let mut settings = Settings::default();
    settings.output.swap_channels = true;
    settings.power.channel_b = 40;
    settings.activity.initial = Some("Chaos".into());
    settings.activity.seed = Some(99);
    settings.track.feel_exponent = 1.5;

    let text = settings.to_toml_string().unwrap();
    let parsed = Settings::from_toml_str(&text).unwrap();
    assert_eq!(parsed, settings);
}

#[test]
fn load_reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[output]
min_frequency = 20.0
max_frequency = 80.0

[device]
channel_a_limit = 100

[activity]
initial = "Penetration"
change_probability = 0.0
"#
    )
    .unwrap();

    let settings = Settings::load(file.path()).unwrap();
    assert!((settings.output.min_frequency - 20.0).abs() < f64::EPSILON);
    assert_eq!(settings.device.channel_a_limit, 100);
    assert_eq!(settings.device.channel_b_limit, 70);
    assert_eq!(settings.activity.initial.as_deref(), Some("Penetration"));
    assert_eq!(settings.activity.change_probability, 0.0);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Settings::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "{err}");
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = Settings::from_toml_str("[output\nmin_frequency = ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)), "{err}");
}

fn rejected(text: &str) -> &'static str {
    match Settings::from_toml_str(text) {
        Err(ConfigError::Invalid { field, .. }) => field,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn out_of_range_values_are_rejected() {
    assert_eq!(
        rejected("[output]\nmin_frequency = 0.5"),
        "output.min_frequency"
    );
    assert_eq!(
        rejected("[output]\nmax_frequency = 250.0"),
        "output.max_frequency"
    );
    assert_eq!(
        rejected("[output]\nmin_frequency = 90.0\nmax_frequency = 50.0"),
        "output.min_frequency"
    );
    assert_eq!(
        rejected("[output]\nplayback_speed = 8.0"),
        "output.playback_speed"
    );
    assert_eq!(
        rejected("[device]\nchannel_b_limit = 201"),
        "device.channel_b_limit"
    );
    assert_eq!(
        rejected("[activity]\nchange_probability = -1.0"),
        "activity.change_probability"
    );
    assert_eq!(
        rejected("[activity]\ngenerator_auto_cycle = 5.0"),
        "activity.generator_auto_cycle"
    );
    assert_eq!(rejected("[track]\nvolume = 1.5"), "track.volume");
}

#[test]
fn device_section_maps_onto_parameters() {
    let settings = Settings::from_toml_str(
        "[device]\nchannel_a_frequency_balance = 200\nchannel_b_intensity_balance = 9",
    )
    .unwrap();
    let frame = settings.device.parameters().to_frame();
    assert_eq!(frame, [0xBF, 70, 70, 200, 160, 0, 9]);
}

#[test]
fn track_section_maps_onto_settings() {
    let settings = Settings::from_toml_str("[track]\nvolume = 0.9").unwrap();
    let track = settings.track.settings();
    assert!((track.volume - 0.9).abs() < f64::EPSILON);
    assert!((track.feel_exponent - 1.0).abs() < f64::EPSILON);
}
