use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ActivityKind, Simulation};
use crate::error::Result;
use crate::math::positional_effect;
use crate::pulse::Pulse;
use crate::random::{chance, random_in_range};
use crate::smoothed::{SmoothedValue, Transition};
use crate::timer::TimerManager;

const POWER: f64 = 0.9;
const HOLD_PROBABILITY: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Timer {
    SpeedChange,
    Hold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TargetReached;

/// A vibrator sliding between random positions, sometimes pausing on arrival.
#[derive(Debug)]
pub struct Vibro {
    rng: StdRng,
    timers: TimerManager<Timer>,
    position: SmoothedValue<TargetReached>,
    speed: f64,
}

impl Vibro {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let speed = rng.gen::<f64>();
        let position = SmoothedValue::new(rng.gen::<f64>());
        let mut vibro = Self {
            rng,
            timers: TimerManager::new(),
            position,
            speed,
        };
        vibro.new_target();
        let delay = random_in_range(&mut vibro.rng, 5.0..=30.0);
        vibro.schedule(Timer::SpeedChange, delay);
        vibro
    }

    fn new_target(&mut self) {
        let target = self.rng.gen::<f64>();
        let move_speed = random_in_range(&mut self.rng, 0.04..=0.3);
        if let Some(TargetReached) =
            self.position
                .set_target_then(target, Transition::Rate(move_speed), TargetReached)
        {
            self.target_reached();
        }
    }

    fn target_reached(&mut self) {
        if chance(&mut self.rng, HOLD_PROBABILITY) {
            let hold = random_in_range(&mut self.rng, 0.0..=3.0);
            self.schedule(Timer::Hold, hold);
        } else {
            self.new_target();
        }
    }

    fn on_timer(&mut self, timer: Timer) {
        match timer {
            Timer::SpeedChange => {
                self.speed = self.rng.gen::<f64>();
                let delay = random_in_range(&mut self.rng, 5.0..=30.0);
                self.schedule(Timer::SpeedChange, delay);
            }
            Timer::Hold => self.new_target(),
        }
    }

    fn schedule(&mut self, timer: Timer, seconds: f64) {
        if let Some(fired) = self.timers.add_timer(timer, seconds) {
            self.on_timer(fired);
        }
    }
}

impl Simulation for Vibro {
    fn display_name(&self) -> &'static str {
        ActivityKind::Vibro.display_name()
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        for timer in self.timers.update(delta)? {
            self.on_timer(timer);
        }
        if let Some(TargetReached) = self.position.update(delta)? {
            self.target_reached();
        }
        Ok(())
    }

    fn try_pulse(&self) -> Result<Pulse> {
        let (amp_a, amp_b) = positional_effect(POWER, self.position.current(), 1.0);
        Ok(Pulse::new(self.speed, self.speed, amp_a, amp_b))
    }
}
