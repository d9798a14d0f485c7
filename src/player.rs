//! Fixed-cadence playback loop.
//!
//! Every step covers 100ms of playback: four pulses are pulled from the
//! active source, post-processed and framed for the device. The caller owns
//! the timing and just calls [`Player::step`] once per period.

use howl_core::coyote::{
    CoyoteEncoder, DeviceParameters, PulseFrame, StatusReport, PULSE_BATCH_SIZE, PULSE_TIME,
};
use howl_core::pulse::Pulse;
use howl_core::source::PulseSource;

use crate::config::Settings;

/// Seconds of playback advanced by one step at normal speed.
pub const STEP_TIME: f64 = PULSE_TIME * PULSE_BATCH_SIZE as f64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    A,
    B,
}

/// Per-pulse output adjustments.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PostProcessing {
    pub frequency_inversion_a: bool,
    pub frequency_inversion_b: bool,
}

impl PostProcessing {
    pub fn apply(&self, pulse: Pulse) -> Pulse {
        let mut out = pulse;
        if self.frequency_inversion_a {
            out.freq_a = 1.0 - pulse.freq_a;
        }
        if self.frequency_inversion_b {
            out.freq_b = 1.0 - pulse.freq_b;
        }
        out
    }
}

/// Slow strength ramp. A channel with non-zero power gains one step every
/// `delay * 10` player steps, i.e. every `delay` seconds of playback.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AutoIncrease {
    pub enabled: bool,
    pub delay_a: u32,
    pub delay_b: u32,
    counter_a: u32,
    counter_b: u32,
}

impl AutoIncrease {
    pub fn new(enabled: bool, delay_a: u32, delay_b: u32) -> Self {
        Self {
            enabled,
            delay_a,
            delay_b,
            ..Self::default()
        }
    }

    /// Returns the channels whose power should go up by one.
    fn tick(&mut self, power: (u8, u8)) -> (bool, bool) {
        if power.0 > 0 {
            self.counter_a += 1;
        }
        if power.1 > 0 {
            self.counter_b += 1;
        }
        let a = self.counter_a >= self.delay_a.saturating_mul(10);
        let b = self.counter_b >= self.delay_b.saturating_mul(10);
        if a {
            self.counter_a = 0;
        }
        if b {
            self.counter_b = 0;
        }
        (a, b)
    }
}

/// Output of one [`Player::step`].
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerStep {
    /// Playback position the batch started at.
    pub time: f64,
    pub pulses: [Pulse; PULSE_BATCH_SIZE],
    /// `None` while globally muted.
    pub frame: Option<PulseFrame>,
}

/// Drives a [`PulseSource`] and produces device frames.
pub struct Player {
    source: Option<Box<dyn PulseSource>>,
    encoder: CoyoteEncoder,
    device: DeviceParameters,
    post: PostProcessing,
    auto_increase: AutoIncrease,
    power: (u8, u8),
    playback_speed: f64,
    global_mute: bool,
    position: f64,
    playing: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl Player {
    pub fn from_settings(settings: &Settings) -> Self {
        let o = &settings.output;
        let mut encoder = CoyoteEncoder::new(o.min_frequency, o.max_frequency);
        encoder.swap_channels = o.swap_channels;
        let device = settings.device.parameters();
        let power = (
            settings.power.channel_a.min(device.channel_a_limit),
            settings.power.channel_b.min(device.channel_b_limit),
        );
        Self {
            source: None,
            encoder,
            device,
            post: PostProcessing {
                frequency_inversion_a: o.frequency_inversion_a,
                frequency_inversion_b: o.frequency_inversion_b,
            },
            auto_increase: AutoIncrease::new(
                settings.power.auto_increase,
                settings.power.auto_increase_delay_a,
                settings.power.auto_increase_delay_b,
            ),
            power,
            playback_speed: o.playback_speed,
            global_mute: o.global_mute,
            position: 0.0,
            playing: false,
        }
    }

    /// Replace the source. Playback stops and rewinds.
    pub fn set_source(&mut self, source: Option<Box<dyn PulseSource>>) {
        if let Some(source) = &source {
            log::info!("pulse source: {}", source.display_name());
        }
        self.source = source;
        self.position = 0.0;
        self.playing = false;
    }

    pub fn source(&self) -> Option<&dyn PulseSource> {
        self.source.as_deref()
    }

    /// Start playing from `from`, or the current position. Returns whether
    /// playback actually started.
    pub fn start(&mut self, from: Option<f64>) -> bool {
        let ready = self.source.as_ref().is_some_and(|s| s.ready_to_play());
        if !ready {
            log::warn!("no pulse source ready, not starting");
            return false;
        }
        if let Some(from) = from {
            self.position = from;
        }
        self.playing = true;
        true
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Move the play head. Only finite sources can seek.
    pub fn seek(&mut self, position: f64) {
        if self.source.as_ref().is_some_and(|s| s.is_finite()) {
            self.position = position;
        }
    }

    pub fn power(&self) -> (u8, u8) {
        self.power
    }

    /// Set a channel's strength, capped at that channel's limit.
    pub fn set_power(&mut self, channel: Channel, power: u8) {
        match channel {
            Channel::A => self.power.0 = power.min(self.device.channel_a_limit),
            Channel::B => self.power.1 = power.min(self.device.channel_b_limit),
        }
    }

    pub fn set_global_mute(&mut self, muted: bool) {
        self.global_mute = muted;
    }

    pub fn set_playback_speed(&mut self, speed: f64) {
        self.playback_speed = speed.clamp(0.25, 4.0);
    }

    pub fn post_processing_mut(&mut self) -> &mut PostProcessing {
        &mut self.post
    }

    pub fn encoder_mut(&mut self) -> &mut CoyoteEncoder {
        &mut self.encoder
    }

    pub fn device_parameters(&self) -> DeviceParameters {
        self.device
    }

    pub fn parameter_frame(&self) -> [u8; 7] {
        self.device.to_frame()
    }

    /// Feed a device strength notification back into the loop.
    ///
    /// Changes made on the device's own dial are adopted as the new power.
    pub fn handle_status(&mut self, report: &StatusReport) {
        self.encoder.acknowledge_status(report);
        if report.is_local_change() {
            self.set_power(Channel::A, report.strength_a);
            self.set_power(Channel::B, report.strength_b);
        }
    }

    /// Pulse times covered by a step starting at `time`.
    pub fn batch_times(&self, time: f64) -> [f64; PULSE_BATCH_SIZE] {
        let step = PULSE_TIME * self.playback_speed;
        std::array::from_fn(|i| time + step * i as f64)
    }

    /// Produce one batch. Returns `None` once playback has stopped.
    pub fn step(&mut self) -> Option<PlayerStep> {
        if !self.playing {
            return None;
        }
        let Some(source) = self.source.as_ref() else {
            self.playing = false;
            return None;
        };

        if let Some(duration) = source.duration().filter(|d| *d > 0.0) {
            if self.position > duration {
                if source.should_loop() {
                    self.position = 0.0;
                } else {
                    log::info!("{} finished", source.display_name());
                    self.playing = false;
                    return None;
                }
            }
        }

        let time = self.position;
        let times = self.batch_times(time);
        let post = self.post;
        let source = self.source.as_mut()?;
        let pulses = times.map(|t| post.apply(source.pulse_at_time(t)));

        let frame = if self.global_mute {
            None
        } else {
            match self.encoder.pulse_frame(self.power.0, self.power.1, &pulses) {
                Ok(frame) => Some(frame),
                Err(err) => {
                    log::error!("failed to frame pulses: {err}");
                    None
                }
            }
        };

        self.position += STEP_TIME * self.playback_speed;
        source.update_state(self.position);
        self.handle_power_auto_increase();

        Some(PlayerStep {
            time,
            pulses,
            frame,
        })
    }

    fn handle_power_auto_increase(&mut self) {
        if !self.auto_increase.enabled || self.global_mute {
            return;
        }
        let (a, b) = self.auto_increase.tick(self.power);
        if a {
            self.set_power(Channel::A, self.power.0.saturating_add(1));
        }
        if b {
            self.set_power(Channel::B, self.power.1.saturating_add(1));
        }
        if a || b {
            log::debug!("power auto-increased to {}/{}", self.power.0, self.power.1);
        }
    }
}
