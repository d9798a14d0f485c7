// Playback loop: batching, post-processing, looping and power ramp.

use std::cell::RefCell;
use std::rc::Rc;

use howl::{Channel, Player, Settings, STEP_TIME};
use howl_core::{ControlTrack, Pulse, PulseSource, StatusReport, PULSE_FRAME_LEN};

/// Records every time it is asked about and answers with a fixed pulse.
struct FixedSource {
    pulse: Pulse,
    duration: Option<f64>,
    looping: bool,
    asked: Vec<f64>,
    updates: Vec<f64>,
}

impl FixedSource {
    fn endless(pulse: Pulse) -> Self {
        Self {
            pulse,
            duration: None,
            looping: false,
            asked: Vec::new(),
            updates: Vec::new(),
        }
    }
}

impl PulseSource for FixedSource {
    fn display_name(&self) -> &str {
        "fixed"
    }
    fn duration(&self) -> Option<f64> {
        self.duration
    }
    fn is_finite(&self) -> bool {
        self.duration.is_some()
    }
    fn should_loop(&self) -> bool {
        self.looping
    }
    fn ready_to_play(&self) -> bool {
        true
    }
    fn pulse_at_time(&mut self, time: f64) -> Pulse {
        self.asked.push(time);
        self.pulse
    }
    fn update_state(&mut self, time: f64) {
        self.updates.push(time);
    }
}

fn steady() -> Pulse {
    Pulse {
        freq_a: 0.2,
        freq_b: 0.7,
        amp_a: 0.5,
        amp_b: 0.25,
    }
}

#[test]
fn player_needs_a_ready_source() {
    let mut player = Player::default();
    assert!(!player.start(None));
    assert!(player.step().is_none());
}

#[test]
fn step_produces_four_pulses_and_a_frame() {
    let mut player = Player::default();
    player.set_source(Some(Box::new(FixedSource::endless(steady()))));
    assert!(player.start(Some(0.0)));
    player.set_power(Channel::A, 12);

    let step = player.step().unwrap();
    assert_eq!(step.time, 0.0);
    assert_eq!(step.pulses, [steady(); 4]);
    let frame = step.frame.unwrap();
    assert_eq!(frame.len(), PULSE_FRAME_LEN);
    assert_eq!(&frame[..4], &[0xB0_u8, 0x1F, 12, 0]);
    assert!((player.position() - STEP_TIME).abs() < 1e-12);
}

#[test]
fn playback_speed_spreads_pulse_times() {
    let mut settings = Settings::default();
    settings.output.playback_speed = 2.0;
    let mut player = Player::from_settings(&settings);
    let times = player.batch_times(1.0);
    for (time, expected) in times.iter().zip([1.0, 1.05, 1.1, 1.15]) {
        assert!((time - expected).abs() < 1e-12, "{time} vs {expected}");
    }
    player.set_source(Some(Box::new(FixedSource::endless(steady()))));
    player.start(Some(0.0));
    player.step().unwrap();
    assert!((player.position() - 0.2).abs() < 1e-12);
}

/// Shares the times it was sampled at with the test.
struct SharedLog(Rc<RefCell<Vec<f64>>>);

impl PulseSource for SharedLog {
    fn display_name(&self) -> &str {
        "shared log"
    }
    fn duration(&self) -> Option<f64> {
        None
    }
    fn is_finite(&self) -> bool {
        false
    }
    fn should_loop(&self) -> bool {
        false
    }
    fn ready_to_play(&self) -> bool {
        true
    }
    fn pulse_at_time(&mut self, time: f64) -> Pulse {
        self.0.borrow_mut().push(time);
        steady()
    }
    fn update_state(&mut self, _time: f64) {}
}

#[test]
fn step_samples_source_at_batch_times() {
    let mut settings = Settings::default();
    settings.output.playback_speed = 2.0;
    let mut player = Player::from_settings(&settings);
    let asked = Rc::new(RefCell::new(Vec::new()));
    player.set_source(Some(Box::new(SharedLog(Rc::clone(&asked)))));
    player.start(Some(1.0));

    let step = player.step().unwrap();
    assert_eq!(step.time, 1.0);
    assert_eq!(asked.borrow().as_slice(), player.batch_times(1.0).as_slice());

    asked.borrow_mut().clear();
    let next = player.step().unwrap();
    assert_eq!(asked.borrow().as_slice(), player.batch_times(next.time).as_slice());
    assert!((next.time - 1.2).abs() < 1e-12, "second batch at {}", next.time);
}

#[test]
fn inversion_and_mute_apply() {
    let mut settings = Settings::default();
    settings.output.frequency_inversion_b = true;
    settings.output.global_mute = true;
    let mut player = Player::from_settings(&settings);
    player.set_source(Some(Box::new(FixedSource::endless(steady()))));
    player.start(None);
    let step = player.step().unwrap();
    assert!(step.frame.is_none());
    let pulse = step.pulses[0];
    assert!((pulse.freq_a - 0.2).abs() < 1e-6);
    assert!((pulse.freq_b - 0.3).abs() < 1e-6);
}

#[test]
fn finite_source_stops_at_its_end() {
    let track = ControlTrack::new("short", &[(0.0, 0.0), (0.35, 1.0)]).unwrap();
    let mut player = Player::default();
    player.set_source(Some(Box::new(track)));
    player.start(Some(0.0));
    let mut steps = 0;
    while player.step().is_some() {
        steps += 1;
        assert!(steps < 100, "never stopped");
    }
    // positions 0.0, 0.1, 0.2, 0.3 play; 0.4 is past the end
    assert_eq!(steps, 4);
    assert!(!player.is_playing());
}

#[test]
fn looping_source_rewinds() {
    let mut fixed = FixedSource::endless(steady());
    fixed.duration = Some(0.25);
    fixed.looping = true;
    let mut player = Player::default();
    player.set_source(Some(Box::new(fixed)));
    player.start(Some(0.0));
    let times: Vec<f64> = (0..5).map(|_| player.step().unwrap().time).collect();
    assert_eq!(times[3], 0.0);
    assert!(player.is_playing());
}

#[test]
fn seek_only_moves_finite_sources() {
    let mut player = Player::default();
    player.set_source(Some(Box::new(FixedSource::endless(steady()))));
    player.seek(3.0);
    assert_eq!(player.position(), 0.0);

    let mut finite = FixedSource::endless(steady());
    finite.duration = Some(10.0);
    player.set_source(Some(Box::new(finite)));
    player.seek(3.0);
    assert_eq!(player.position(), 3.0);
}

#[test]
fn power_auto_increase_steps_once_per_delay() {
    let mut settings = Settings::default();
    settings.power.auto_increase = true;
    settings.power.auto_increase_delay_a = 1;
    settings.power.auto_increase_delay_b = 1;
    settings.power.channel_a = 10;
    settings.device.channel_a_limit = 11;
    let mut player = Player::from_settings(&settings);
    player.set_source(Some(Box::new(FixedSource::endless(steady()))));
    player.start(Some(0.0));

    for _ in 0..10 {
        player.step().unwrap();
    }
    // channel B has no power so it never ramps
    assert_eq!(player.power(), (11, 0));
    for _ in 0..30 {
        player.step().unwrap();
    }
    assert_eq!(player.power(), (11, 0), "capped at the channel limit");
}

#[test]
fn power_is_capped_at_limits() {
    let mut player = Player::default();
    player.set_power(Channel::A, 250);
    player.set_power(Channel::B, 30);
    assert_eq!(player.power(), (70, 30));
}

#[test]
fn device_dial_changes_are_adopted() {
    let mut player = Player::default();
    player.set_source(Some(Box::new(FixedSource::endless(steady()))));
    player.start(Some(0.0));
    player.handle_status(&StatusReport {
        sequence: 0,
        strength_a: 15,
        strength_b: 25,
    });
    assert_eq!(player.power(), (15, 25));
    let frame = player.step().unwrap().frame.unwrap();
    assert_eq!(frame[1], 0x00, "strengths already known to the device");
}

#[test]
fn parameter_frame_uses_device_settings() {
    let mut settings = Settings::default();
    settings.device.channel_b_limit = 120;
    let player = Player::from_settings(&settings);
    assert_eq!(player.parameter_frame(), [0xBF, 70, 120, 160, 160, 0, 0]);
}
