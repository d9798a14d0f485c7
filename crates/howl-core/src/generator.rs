//! Free-form two-channel signal generator.
//!
//! Each channel samples one catalog shape for amplitude and another for
//! frequency, scaling both between smoothed low/high bounds. Optional
//! auto-change hooks keep nudging speed, ranges and shapes at random.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::activity::Simulation;
use crate::error::Result;
use crate::pulse::Pulse;
use crate::random::{chance, derive_seed, random_in_range};
use crate::shapes::GeneratorShape;
use crate::smoothed::{SmoothedValue, Transition};
use crate::timer::TimerManager;
use crate::wave_manager::WaveManager;

/// Allowed cycle period in seconds.
pub const PERIOD_RANGE: RangeInclusive<f64> = 0.5..=10.0;
/// Allowed interval for full re-randomisation in seconds.
pub const AUTO_CYCLE_RANGE: RangeInclusive<f64> = 10.0..=300.0;
pub const DEFAULT_AUTO_CYCLE_SECS: f64 = 90.0;

const AMPLITUDE_WAVE: &str = "amplitude";
const FREQUENCY_WAVE: &str = "frequency";

/// Which of a channel's two sampled parameters an operation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parameter {
    Amplitude,
    Frequency,
}

/// Full description of one generator channel.
///
/// Fields:
/// - `amplitude_shape` / `frequency_shape`: catalog shapes sampled each cycle
/// - `period`: seconds per cycle, within [`PERIOD_RANGE`]
/// - `amplitude_low..amplitude_high`: output bounds for the amplitude shape
/// - `frequency_low..frequency_high`: output bounds for the frequency shape
/// - `time_offset`: seconds the channel runs ahead of its own clock, at most half a period
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelParameters {
    pub amplitude_shape: GeneratorShape,
    pub frequency_shape: GeneratorShape,
    pub period: f64,
    pub amplitude_low: f64,
    pub amplitude_high: f64,
    pub frequency_low: f64,
    pub frequency_high: f64,
    pub time_offset: f64,
}

impl ChannelParameters {
    /// Draw a random but pleasant parameter set.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let scale = if rng.gen_bool(0.5) { 2.5 } else { 9.5 };
        let period = rng.gen::<f64>() * scale + 0.5;

        let mut amplitude_low = rng.gen::<f64>() * 0.4;
        let mut amplitude_high = 0.5 + rng.gen::<f64>() * 0.5;
        if rng.gen_bool(0.5) {
            std::mem::swap(&mut amplitude_low, &mut amplitude_high);
        }
        let amplitude_shape = *GeneratorShape::ALL
            .choose(rng)
            .unwrap_or(&GeneratorShape::Triangle);
        let frequency_shape = *GeneratorShape::ALL
            .choose(rng)
            .unwrap_or(&GeneratorShape::Triangle);
        let frequency_high = rng.gen::<f64>();
        let mut frequency_low = rng.gen::<f64>();

        if amplitude_shape == GeneratorShape::Constant {
            amplitude_low = rng.gen::<f64>() * 0.5 + 0.5;
            amplitude_high = amplitude_low;
        }
        if frequency_shape == GeneratorShape::Constant {
            frequency_low = frequency_high;
        }
        Self {
            amplitude_shape,
            frequency_shape,
            period,
            amplitude_low,
            amplitude_high,
            frequency_low,
            frequency_high,
            time_offset: 0.0,
        }
    }

    /// Draw a pair for channels A and B. B sometimes shares A's period and
    /// sometimes runs up to half a period ahead.
    pub fn random_pair<R: Rng + ?Sized>(rng: &mut R) -> (Self, Self) {
        let a = Self::random(rng);
        let mut b = Self::random(rng);
        if rng.gen_bool(0.5) {
            b.period = a.period;
        }
        if rng.gen_bool(0.5) {
            b.time_offset = rng.gen::<f64>() * b.period / 2.0;
        }
        (a, b)
    }
}

/// Per-minute probabilities for each kind of automatic change.
///
/// A probability of zero disables that change. `cycle_secs`, when set,
/// re-randomises everything on a fixed interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoChange {
    pub speed_per_minute: f64,
    pub amplitude_per_minute: f64,
    pub frequency_per_minute: f64,
    pub shape_per_minute: f64,
    pub cycle_secs: Option<f64>,
}

impl Default for AutoChange {
    fn default() -> Self {
        Self {
            speed_per_minute: 1.0,
            amplitude_per_minute: 1.0,
            frequency_per_minute: 1.0,
            shape_per_minute: 0.5,
            cycle_secs: None,
        }
    }
}

impl AutoChange {
    /// No automatic changes at all.
    pub fn disabled() -> Self {
        Self {
            speed_per_minute: 0.0,
            amplitude_per_minute: 0.0,
            frequency_per_minute: 0.0,
            shape_per_minute: 0.0,
            cycle_secs: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ShapeBoundary;

/// One output channel of the [`Generator`].
#[derive(Debug)]
pub struct GeneratorChannel {
    wave: WaveManager<ShapeBoundary>,
    amplitude_shape: GeneratorShape,
    frequency_shape: GeneratorShape,
    pending_amplitude: Option<GeneratorShape>,
    pending_frequency: Option<GeneratorShape>,
    amplitude_low: SmoothedValue,
    amplitude_high: SmoothedValue,
    frequency_low: SmoothedValue,
    frequency_high: SmoothedValue,
    time_offset: f64,
}

impl GeneratorChannel {
    pub fn new(seed: u64, parameters: &ChannelParameters) -> Result<Self> {
        let mut channel = Self {
            wave: WaveManager::new(seed),
            amplitude_shape: parameters.amplitude_shape,
            frequency_shape: parameters.frequency_shape,
            pending_amplitude: None,
            pending_frequency: None,
            amplitude_low: SmoothedValue::new(parameters.amplitude_low),
            amplitude_high: SmoothedValue::new(parameters.amplitude_high),
            frequency_low: SmoothedValue::new(parameters.frequency_low),
            frequency_high: SmoothedValue::new(parameters.frequency_high),
            time_offset: 0.0,
        };
        channel.apply(parameters)?;
        Ok(channel)
    }

    /// Replace every parameter at once and restart the cycle.
    pub fn apply(&mut self, parameters: &ChannelParameters) -> Result<()> {
        self.amplitude_shape = parameters.amplitude_shape;
        self.frequency_shape = parameters.frequency_shape;
        self.pending_amplitude = None;
        self.pending_frequency = None;
        self.wave
            .insert_wave(AMPLITUDE_WAVE, parameters.amplitude_shape.wave_shape()?);
        self.wave
            .insert_wave(FREQUENCY_WAVE, parameters.frequency_shape.wave_shape()?);
        self.wave.restart();
        self.wave.set_speed(period_to_speed(parameters.period));
        self.amplitude_low.set_immediately(parameters.amplitude_low);
        self.amplitude_high.set_immediately(parameters.amplitude_high);
        self.frequency_low.set_immediately(parameters.frequency_low);
        self.frequency_high.set_immediately(parameters.frequency_high);
        self.set_time_offset(parameters.time_offset);
        Ok(())
    }

    pub fn shape(&self, parameter: Parameter) -> GeneratorShape {
        match parameter {
            Parameter::Amplitude => self.amplitude_shape,
            Parameter::Frequency => self.frequency_shape,
        }
    }

    /// Queue a shape change that takes effect at the next cycle boundary.
    pub fn set_shape(&mut self, parameter: Parameter, shape: GeneratorShape) {
        match parameter {
            Parameter::Amplitude => self.pending_amplitude = Some(shape),
            Parameter::Frequency => self.pending_frequency = Some(shape),
        }
        self.wave.stop_at_end_of_cycle(ShapeBoundary);
    }

    pub fn period(&self) -> f64 {
        1.0 / self.wave.target_speed()
    }

    /// Ease toward a new period (seconds per cycle) at `rate` cycles/s².
    pub fn set_period(&mut self, period: f64, rate: f64) {
        self.wave.set_target_speed(period_to_speed(period), rate);
    }

    pub fn time_offset(&self) -> f64 {
        self.time_offset
    }

    pub fn set_time_offset(&mut self, seconds: f64) {
        self.time_offset = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    }

    pub fn set_amplitude_range(&mut self, low: f64, high: f64, transition: Transition) {
        self.amplitude_low.set_target(low.clamp(0.0, 1.0), transition);
        self.amplitude_high.set_target(high.clamp(0.0, 1.0), transition);
    }

    pub fn set_frequency_range(&mut self, low: f64, high: f64, transition: Transition) {
        self.frequency_low.set_target(low.clamp(0.0, 1.0), transition);
        self.frequency_high.set_target(high.clamp(0.0, 1.0), transition);
    }

    pub fn update(&mut self, delta: f64) -> Result<()> {
        self.amplitude_low.update(delta)?;
        self.amplitude_high.update(delta)?;
        self.frequency_low.update(delta)?;
        self.frequency_high.update(delta)?;
        for _boundary in self.wave.update(delta)? {
            self.swap_pending_shapes()?;
        }
        Ok(())
    }

    fn swap_pending_shapes(&mut self) -> Result<()> {
        if let Some(shape) = self.pending_amplitude.take() {
            self.wave.insert_wave(AMPLITUDE_WAVE, shape.wave_shape()?);
            self.amplitude_shape = shape;
        }
        if let Some(shape) = self.pending_frequency.take() {
            self.wave.insert_wave(FREQUENCY_WAVE, shape.wave_shape()?);
            self.frequency_shape = shape;
        }
        log::debug!(
            "generator shapes now {} / {}",
            self.amplitude_shape.name(),
            self.frequency_shape.name()
        );
        self.wave.restart();
        Ok(())
    }

    /// Current `(frequency, amplitude)` for this channel.
    pub fn sample(&self) -> Result<(f64, f64)> {
        let time = self.wave.current_time() + self.time_offset * self.wave.target_speed();
        let scale = self.wave.current_amplitude();
        let amplitude = scale * self.wave.wave(AMPLITUDE_WAVE)?.position(time);
        let frequency = scale * self.wave.wave(FREQUENCY_WAVE)?.position(time);
        Ok((
            lerp(self.frequency_low.current(), self.frequency_high.current(), frequency),
            lerp(self.amplitude_low.current(), self.amplitude_high.current(), amplitude),
        ))
    }
}

#[inline]
fn lerp(low: f64, high: f64, t: f64) -> f64 {
    low + (high - low) * t
}

#[inline]
fn period_to_speed(period: f64) -> f64 {
    1.0 / period.clamp(*PERIOD_RANGE.start(), *PERIOD_RANGE.end())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct AutoCycle;

/// Two-channel generator with optional random drift.
///
/// Typical usage:
/// - `Generator::new(seed)` starts from random parameters
/// - adjust `channel_mut(..)` directly or set [`AutoChange`] probabilities
/// - drive through [`Simulation`] like any activity
#[derive(Debug)]
pub struct Generator {
    rng: StdRng,
    channel_a: GeneratorChannel,
    channel_b: GeneratorChannel,
    auto_change: AutoChange,
    timers: TimerManager<AutoCycle>,
}

impl Generator {
    pub fn new(seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (a, b) = ChannelParameters::random_pair(&mut rng);
        Ok(Self {
            rng,
            channel_a: GeneratorChannel::new(derive_seed(seed, 1), &a)?,
            channel_b: GeneratorChannel::new(derive_seed(seed, 2), &b)?,
            auto_change: AutoChange::default(),
            timers: TimerManager::new(),
        })
    }

    pub fn channel(&self, index: usize) -> Option<&GeneratorChannel> {
        match index {
            0 => Some(&self.channel_a),
            1 => Some(&self.channel_b),
            _ => None,
        }
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut GeneratorChannel> {
        match index {
            0 => Some(&mut self.channel_a),
            1 => Some(&mut self.channel_b),
            _ => None,
        }
    }

    pub fn auto_change(&self) -> AutoChange {
        self.auto_change
    }

    pub fn set_auto_change(&mut self, auto_change: AutoChange) {
        self.auto_change = auto_change;
        self.timers.cancel_timer(&AutoCycle);
        if let Some(secs) = auto_change.cycle_secs {
            self.schedule_cycle(secs);
        }
    }

    fn schedule_cycle(&mut self, secs: f64) {
        let secs = secs.clamp(*AUTO_CYCLE_RANGE.start(), *AUTO_CYCLE_RANGE.end());
        let fired = self.timers.add_timer(AutoCycle, secs);
        debug_assert!(fired.is_none());
    }

    /// Re-draw both channels, see [`ChannelParameters::random_pair`].
    pub fn randomise(&mut self) -> Result<()> {
        let (a, b) = ChannelParameters::random_pair(&mut self.rng);
        log::debug!(
            "generator randomised: A {} {:.2}s, B {} {:.2}s +{:.2}s",
            a.amplitude_shape.name(),
            a.period,
            b.amplitude_shape.name(),
            b.period,
            b.time_offset
        );
        self.channel_a.apply(&a)?;
        self.channel_b.apply(&b)
    }

    fn apply_auto_changes(&mut self, delta: f64) {
        let auto = self.auto_change;
        let minutes = delta / 60.0;
        for index in 0..2 {
            if chance(&mut self.rng, auto.speed_per_minute * minutes) {
                let period = random_in_range(&mut self.rng, PERIOD_RANGE);
                let rate = random_in_range(&mut self.rng, 0.05..=0.3);
                self.channel_by_index(index).set_period(period, rate);
            }
            if chance(&mut self.rng, auto.amplitude_per_minute * minutes) {
                let low = self.rng.gen::<f64>() * 0.4;
                let high = 0.5 + self.rng.gen::<f64>() * 0.5;
                let secs = random_in_range(&mut self.rng, 2.0..=8.0);
                self.channel_by_index(index)
                    .set_amplitude_range(low, high, Transition::Duration(secs));
            }
            if chance(&mut self.rng, auto.frequency_per_minute * minutes) {
                let low = self.rng.gen::<f64>();
                let high = self.rng.gen::<f64>();
                let secs = random_in_range(&mut self.rng, 2.0..=8.0);
                self.channel_by_index(index)
                    .set_frequency_range(low, high, Transition::Duration(secs));
            }
            if chance(&mut self.rng, auto.shape_per_minute * minutes) {
                let parameter = if self.rng.gen_bool(0.5) {
                    Parameter::Amplitude
                } else {
                    Parameter::Frequency
                };
                let shape = *GeneratorShape::ALL
                    .choose(&mut self.rng)
                    .unwrap_or(&GeneratorShape::Triangle);
                self.channel_by_index(index).set_shape(parameter, shape);
            }
        }
    }

    fn channel_by_index(&mut self, index: usize) -> &mut GeneratorChannel {
        if index == 0 {
            &mut self.channel_a
        } else {
            &mut self.channel_b
        }
    }
}

impl Simulation for Generator {
    fn display_name(&self) -> &'static str {
        "Generator"
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        for _cycle in self.timers.update(delta)? {
            self.randomise()?;
            if let Some(secs) = self.auto_change.cycle_secs {
                self.schedule_cycle(secs);
            }
        }
        self.apply_auto_changes(delta);
        self.channel_a.update(delta)?;
        self.channel_b.update(delta)?;
        Ok(())
    }

    fn try_pulse(&self) -> Result<Pulse> {
        let (freq_a, amp_a) = self.channel_a.sample()?;
        let (freq_b, amp_b) = self.channel_b.sample()?;
        Ok(Pulse::new(freq_a, freq_b, amp_a, amp_b))
    }
}
