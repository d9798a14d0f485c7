use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ActivityKind, Simulation};
use crate::error::Result;
use crate::pulse::Pulse;
use crate::random::{chance, derive_seed, random_in_range};
use crate::timer::TimerManager;
use crate::wave::{Interpolation, WaveShape};
use crate::wave_manager::WaveManager;

const SHAPE_CHANGE_PROBABILITY: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Timer {
    SpeedChange,
    ProportionChange,
}

/// Per-field mix proportions between the two waves.
#[derive(Clone, Copy, Debug, Default)]
struct Proportions {
    amp_a: f64,
    amp_b: f64,
    freq_a: f64,
    freq_b: f64,
}

/// Two free-running waves mixed into each field by drifting proportions.
///
/// Either wave may be swapped for a freshly generated shape whenever the
/// proportions change.
#[derive(Debug)]
pub struct Additive {
    rng: StdRng,
    first: WaveManager,
    second: WaveManager,
    timers: TimerManager<Timer>,
    proportions: Proportions,
}

impl Additive {
    pub fn new(seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut first = WaveManager::new(derive_seed(seed, 1));
        let mut second = WaveManager::new(derive_seed(seed, 2));
        first.add_wave(random_wave(&mut rng)?);
        second.add_wave(random_wave(&mut rng)?);
        first.set_speed(random_in_range(&mut rng, 0.05..=3.0));
        second.set_speed(random_in_range(&mut rng, 0.05..=3.0));

        let mut additive = Self {
            rng,
            first,
            second,
            timers: TimerManager::new(),
            proportions: Proportions::default(),
        };
        additive.on_timer(Timer::SpeedChange)?;
        additive.on_timer(Timer::ProportionChange)?;
        Ok(additive)
    }

    fn on_timer(&mut self, timer: Timer) -> Result<()> {
        let next = match timer {
            Timer::SpeedChange => {
                let speed = random_in_range(&mut self.rng, 0.05..=3.0);
                let rate = random_in_range(&mut self.rng, 0.03..=0.2);
                let wave = if self.rng.gen_bool(0.5) {
                    &mut self.first
                } else {
                    &mut self.second
                };
                wave.set_target_speed(speed, rate);
                random_in_range(&mut self.rng, 10.0..=30.0)
            }
            Timer::ProportionChange => {
                self.proportions = Proportions {
                    amp_a: self.rng.gen(),
                    amp_b: self.rng.gen(),
                    freq_a: self.rng.gen(),
                    freq_b: self.rng.gen(),
                };
                let next = random_in_range(&mut self.rng, 10.0..=50.0);
                if chance(&mut self.rng, SHAPE_CHANGE_PROBABILITY) {
                    self.first.add_wave(random_wave(&mut self.rng)?);
                }
                if chance(&mut self.rng, SHAPE_CHANGE_PROBABILITY) {
                    self.second.add_wave(random_wave(&mut self.rng)?);
                }
                next
            }
        };
        match self.timers.add_timer(timer, next) {
            Some(fired) => self.on_timer(fired),
            None => Ok(()),
        }
    }
}

/// Rise-and-fall wave peaking at a random point in the cycle.
fn random_wave(rng: &mut StdRng) -> Result<WaveShape> {
    let peak = random_in_range(rng, 0.01..=0.99);
    WaveShape::from_triples(
        "main",
        &[(0.0, 0.0, 0.0), (peak, 0.9, 0.0)],
        Interpolation::Hermite,
    )
}

impl Simulation for Additive {
    fn display_name(&self) -> &'static str {
        ActivityKind::Additive.display_name()
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        for timer in self.timers.update(delta)? {
            self.on_timer(timer)?;
        }
        self.first.update(delta)?;
        self.second.update(delta)?;
        Ok(())
    }

    fn try_pulse(&self) -> Result<Pulse> {
        let p1 = self.first.position("main", true)?;
        let p2 = self.second.position("main", true)?;
        let mix = |proportion: f64| p1 * proportion + p2 * (1.0 - proportion);
        let p = self.proportions;
        Ok(Pulse::new(
            mix(p.freq_a),
            mix(p.freq_b),
            mix(p.amp_a),
            mix(p.amp_b),
        ))
    }
}
