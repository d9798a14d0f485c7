use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ActivityKind, Simulation};
use crate::error::Result;
use crate::pulse::Pulse;
use crate::random::{random_in_range, random_int_in_range};
use crate::timer::TimerManager;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct RandomiseEveryChange;

/// Pure noise: every field re-drawn every N ticks, N itself drifting.
#[derive(Debug)]
pub struct Chaos {
    rng: StdRng,
    timers: TimerManager<RandomiseEveryChange>,
    randomise_every: u32,
    counter: u32,
    pulse: Pulse,
}

impl Chaos {
    pub fn new(seed: u64) -> Self {
        let mut chaos = Self {
            rng: StdRng::seed_from_u64(seed),
            timers: TimerManager::new(),
            randomise_every: 1,
            counter: 0,
            pulse: Pulse::ZERO,
        };
        chaos.randomise();
        chaos.change_interval();
        chaos
    }

    fn randomise(&mut self) {
        let amp_a = self.rng.gen::<f64>();
        let amp_b = self.rng.gen::<f64>();
        let freq_a = self.rng.gen::<f64>();
        let freq_b = self.rng.gen::<f64>();
        self.pulse = Pulse::new(freq_a, freq_b, amp_a, amp_b);
    }

    fn change_interval(&mut self) {
        self.randomise_every = random_int_in_range(&mut self.rng, 1..=10);
        let next = random_in_range(&mut self.rng, 10.0..=30.0);
        if self.timers.add_timer(RandomiseEveryChange, next).is_some() {
            self.change_interval();
        }
    }
}

impl Simulation for Chaos {
    fn display_name(&self) -> &'static str {
        ActivityKind::Chaos.display_name()
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        for _ in self.timers.update(delta)? {
            self.change_interval();
        }
        self.counter += 1;
        if self.counter >= self.randomise_every {
            self.counter = 0;
            self.randomise();
        }
        Ok(())
    }

    fn try_pulse(&self) -> Result<Pulse> {
        Ok(self.pulse)
    }
}
