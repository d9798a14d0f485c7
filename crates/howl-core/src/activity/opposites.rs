use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ActivityKind, Simulation};
use crate::error::Result;
use crate::pulse::Pulse;
use crate::random::random_in_range;
use crate::smoothed::{SmoothedValue, Transition};
use crate::timer::TimerManager;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Retarget {
    Amplitude,
    Frequency,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SpeedChange;

/// Channel B always mirrors channel A (`1 - value`) in amplitude and frequency.
///
/// Channel A's amplitude and frequency drift toward random targets at a pace
/// set by a third, slowly changing "overall speed".
#[derive(Debug)]
pub struct Opposites {
    rng: StdRng,
    timers: TimerManager<SpeedChange>,
    amp_a: SmoothedValue<Retarget>,
    freq_a: SmoothedValue<Retarget>,
    overall_speed: SmoothedValue,
}

impl Opposites {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let amp_a = SmoothedValue::new(rng.gen::<f64>());
        let freq_a = SmoothedValue::new(rng.gen::<f64>());
        let overall_speed = SmoothedValue::new(random_in_range(&mut rng, 0.5..=3.0));
        let mut opposites = Self {
            rng,
            timers: TimerManager::new(),
            amp_a,
            freq_a,
            overall_speed,
        };
        opposites.retarget(Retarget::Amplitude);
        opposites.retarget(Retarget::Frequency);
        opposites.speed_change();
        opposites
    }

    fn change_rate(&mut self) -> f64 {
        let speed = self.overall_speed.current();
        random_in_range(&mut self.rng, 0.15 * speed..=0.4 * speed)
    }

    fn retarget(&mut self, which: Retarget) {
        let target = self.rng.gen::<f64>();
        let rate = self.change_rate();
        let value = match which {
            Retarget::Amplitude => &mut self.amp_a,
            Retarget::Frequency => &mut self.freq_a,
        };
        if let Some(reached) = value.set_target_then(target, Transition::Rate(rate), which) {
            self.retarget(reached);
        }
    }

    fn speed_change(&mut self) {
        let speed = random_in_range(&mut self.rng, 0.5..=3.0);
        let rate = random_in_range(&mut self.rng, 0.2..=0.5);
        let next = random_in_range(&mut self.rng, 10.0..=20.0);
        self.overall_speed.set_target(speed, Transition::Rate(rate));
        if self.timers.add_timer(SpeedChange, next).is_some() {
            self.speed_change();
        }
    }
}

impl Simulation for Opposites {
    fn display_name(&self) -> &'static str {
        ActivityKind::Opposites.display_name()
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        for _ in self.timers.update(delta)? {
            self.speed_change();
        }
        if let Some(reached) = self.amp_a.update(delta)? {
            self.retarget(reached);
        }
        if let Some(reached) = self.freq_a.update(delta)? {
            self.retarget(reached);
        }
        self.overall_speed.update(delta)?;
        Ok(())
    }

    fn try_pulse(&self) -> Result<Pulse> {
        let amp_a = self.amp_a.current();
        let freq_a = self.freq_a.current();
        Ok(Pulse::new(freq_a, 1.0 - freq_a, amp_a, 1.0 - amp_a))
    }
}
