use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{ActivityKind, Simulation};
use crate::error::Result;
use crate::math::{feel_adjustment, scale_velocity};
use crate::pulse::Pulse;
use crate::random::{derive_seed, random_in_range};
use crate::smoothed::{SmoothedValue, Transition};
use crate::timer::TimerManager;
use crate::wave::{Interpolation, WaveShape};
use crate::wave_manager::WaveManager;

const MIN_SPEED: f64 = 0.3;
const MAX_SPEED: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Timer {
    SpeedChange,
    FeelChange,
}

/// Asymmetric thrusting wave with wandering speed and feel.
///
/// Frequency follows `position ^ feel` where the feel exponent drifts in
/// \[1, 2\]; amplitude grows with the current speed.
#[derive(Debug)]
pub struct Penetration {
    rng: StdRng,
    wave: WaveManager,
    timers: TimerManager<Timer>,
    feel_exponent: SmoothedValue,
}

impl Penetration {
    pub fn new(seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut wave = WaveManager::new(derive_seed(seed, 1));
        wave.add_wave(WaveShape::from_triples(
            "penetration",
            &[
                (0.0, 0.0, 0.0),
                (0.4, 0.95, 0.2),
                (0.5, 0.97, 0.0),
                (0.6, 0.95, -0.2),
            ],
            Interpolation::Hermite,
        )?);
        wave.set_speed_variance(0.2);
        wave.set_amplitude_variance(0.1);
        let feel_exponent = SmoothedValue::new(random_in_range(&mut rng, 1.0..=2.0));

        let mut activity = Self {
            rng,
            wave,
            timers: TimerManager::new(),
            feel_exponent,
        };
        activity.on_timer(Timer::SpeedChange);
        activity.on_timer(Timer::FeelChange);
        activity.wave.set_speed(0.15);
        activity.wave.set_target_speed(0.5, 0.1);
        Ok(activity)
    }

    fn on_timer(&mut self, timer: Timer) {
        let next = match timer {
            Timer::SpeedChange => {
                let speed = random_in_range(&mut self.rng, MIN_SPEED..=MAX_SPEED);
                let rate = random_in_range(&mut self.rng, 0.05..=0.3);
                self.wave.set_target_speed(speed, rate);
                random_in_range(&mut self.rng, 1.0..=20.0)
            }
            Timer::FeelChange => {
                let feel = random_in_range(&mut self.rng, 1.0..=2.0);
                let rate = random_in_range(&mut self.rng, 0.05..=0.1);
                self.feel_exponent.set_target(feel, Transition::Rate(rate));
                random_in_range(&mut self.rng, 2.0..=10.0)
            }
        };
        self.schedule(timer, next);
    }

    fn schedule(&mut self, timer: Timer, seconds: f64) {
        if let Some(fired) = self.timers.add_timer(timer, seconds) {
            self.on_timer(fired);
        }
    }
}

impl Simulation for Penetration {
    fn display_name(&self) -> &'static str {
        ActivityKind::Penetration.display_name()
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        for timer in self.timers.update(delta)? {
            self.on_timer(timer);
        }
        self.feel_exponent.update(delta)?;
        self.wave.update(delta)?;
        Ok(())
    }

    fn try_pulse(&self) -> Result<Pulse> {
        let (position, velocity) = self.wave.position_and_velocity("penetration", true)?;
        let scaled_velocity = scale_velocity(velocity, 0.1);
        let feel = self.feel_exponent.current();
        let amplitude_factor =
            0.8 + 0.2 * (self.wave.current_speed() - MIN_SPEED) / (MAX_SPEED - MIN_SPEED);
        Ok(Pulse::new(
            feel_adjustment(position * 0.7, feel),
            feel_adjustment(scaled_velocity * 0.5 + position * 0.4, feel),
            position * amplitude_factor,
            (scaled_velocity * 0.6 + position * 0.4) * amplitude_factor,
        ))
    }
}
