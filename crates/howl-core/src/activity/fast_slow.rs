use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{ActivityKind, Simulation};
use crate::error::Result;
use crate::math::scale_between;
use crate::pulse::Pulse;
use crate::random::{chance, derive_seed, random_in_range};
use crate::shapes::TMAX;
use crate::wave::{Interpolation, WaveShape};
use crate::wave_manager::WaveManager;

const MIN_SPEED: f64 = 0.15;
const MAX_SPEED: f64 = 5.0;
const SWITCH_PROBABILITY: f64 = 0.1;
const SHAPE_CHANGE_PROBABILITY: f64 = 0.2;

const WAVES: [(&str, f64, f64, Interpolation); 4] = [
    ("sawtooth", 0.0, 0.9, Interpolation::Linear),
    ("reverseSawtooth", 0.9, 0.0, Interpolation::Linear),
    ("hermiteSawtooth", 0.0, 0.9, Interpolation::Hermite),
    ("hermiteReverseSawtooth", 0.9, 0.0, Interpolation::Hermite),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RampComplete;

/// Two sawtooth drivers ramping in opposite directions between slow and fast.
///
/// When the primary ramp completes the directions flip. Each flip may also
/// change either channel's wave shape and swap which channel gets which
/// amplitude or frequency.
#[derive(Debug)]
pub struct FastSlow {
    rng: StdRng,
    primary: WaveManager<RampComplete>,
    secondary: WaveManager,
    accelerating: bool,
    switch_amplitudes: bool,
    switch_frequencies: bool,
    wave_a: &'static str,
    wave_b: &'static str,
}

impl FastSlow {
    pub fn new(seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut primary = WaveManager::new(derive_seed(seed, 1));
        let mut secondary = WaveManager::new(derive_seed(seed, 2));
        for (name, start, end, interpolation) in WAVES {
            let shape =
                WaveShape::from_triples(name, &[(0.0, start, 0.0), (TMAX, end, 0.0)], interpolation)?;
            primary.add_wave(shape.clone());
            secondary.add_wave(shape);
        }
        let switch_amplitudes = rng.gen_bool(0.5);
        let switch_frequencies = rng.gen_bool(0.5);

        let mut activity = Self {
            rng,
            primary,
            secondary,
            accelerating: false,
            switch_amplitudes,
            switch_frequencies,
            wave_a: WAVES[0].0,
            wave_b: WAVES[0].0,
        };
        activity.next_iteration();
        Ok(activity)
    }

    fn random_wave(&mut self) -> &'static str {
        WAVES.choose(&mut self.rng).map_or(WAVES[0].0, |wave| wave.0)
    }

    fn next_iteration(&mut self) {
        self.accelerating = !self.accelerating;
        let (start, target) = if self.accelerating {
            (MIN_SPEED, MAX_SPEED)
        } else {
            (MAX_SPEED, MIN_SPEED)
        };
        let rate = random_in_range(&mut self.rng, 0.1..=0.3);
        self.primary.set_speed(start);
        let completed = self.primary.set_target_speed_then(target, rate, RampComplete);
        self.secondary.set_speed(target);
        self.secondary.set_target_speed(start, rate);

        if chance(&mut self.rng, SHAPE_CHANGE_PROBABILITY) {
            self.wave_a = self.random_wave();
        }
        if chance(&mut self.rng, SHAPE_CHANGE_PROBABILITY) {
            self.wave_b = self.random_wave();
        }
        if chance(&mut self.rng, SWITCH_PROBABILITY) {
            self.switch_amplitudes = !self.switch_amplitudes;
        }
        if chance(&mut self.rng, SWITCH_PROBABILITY) {
            self.switch_frequencies = !self.switch_frequencies;
        }
        if completed.is_some() {
            self.next_iteration();
        }
    }
}

impl Simulation for FastSlow {
    fn display_name(&self) -> &'static str {
        ActivityKind::FastSlow.display_name()
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        for _ in self.primary.update(delta)? {
            self.next_iteration();
        }
        self.secondary.update(delta)?;
        Ok(())
    }

    fn try_pulse(&self) -> Result<Pulse> {
        let phase = (self.primary.current_speed() - MIN_SPEED) / (MAX_SPEED - MIN_SPEED);
        let mut amp_a = self.secondary.position(self.wave_a, true)?;
        let mut amp_b = self.primary.position(self.wave_b, true)?;
        let mut freq_a = scale_between(1.0 - phase, 0.0, 1.0);
        let mut freq_b = scale_between(phase, 0.0, 1.0);
        if self.switch_amplitudes {
            std::mem::swap(&mut amp_a, &mut amp_b);
        }
        if self.switch_frequencies {
            std::mem::swap(&mut freq_a, &mut freq_b);
        }
        Ok(Pulse::new(freq_a, freq_b, amp_a, amp_b))
    }
}
