use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{ActivityKind, Simulation};
use crate::error::Result;
use crate::math::positional_effect;
use crate::pulse::Pulse;
use crate::random::{chance, derive_seed, random_in_range};
use crate::timer::TimerManager;
use crate::wave::{Interpolation, WaveShape};
use crate::wave_manager::WaveManager;

const START_FREQ: f64 = 0.15;
const END_FREQ: f64 = 0.65;
const BONUS_START_FREQ: f64 = 0.8;
const BONUS_END_FREQ: f64 = 1.0;
const BONUS_WEIGHT: f64 = 0.7;
const BONUS_EVENTS_PER_MINUTE: f64 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Timer {
    SpeedChange,
    BonusA,
    BonusB,
}

/// Steady stroking with occasional fast "bonus" bursts on one channel.
///
/// A bonus blends 70% of a quicker secondary wave into its channel for
/// 10 to 25 seconds. Only one channel can be in a bonus at a time.
#[derive(Debug)]
pub struct LuxuryHj {
    rng: StdRng,
    hj: WaveManager,
    bonus: WaveManager,
    timers: TimerManager<Timer>,
}

impl LuxuryHj {
    pub fn new(seed: u64) -> Result<Self> {
        let mut hj = WaveManager::new(derive_seed(seed, 1));
        hj.add_wave(WaveShape::from_triples(
            "hj",
            &[(0.0, 0.0, 0.0), (0.5, 1.0, 0.0)],
            Interpolation::Hermite,
        )?);
        hj.set_speed_variance(0.2);
        hj.set_amplitude_variance(0.2);
        hj.set_amplitude_variance_ease_in(1.0);
        hj.set_speed(0.5);

        let mut bonus = WaveManager::new(derive_seed(seed, 2));
        bonus.add_wave(WaveShape::from_triples(
            "bonus",
            &[(0.0, 0.6, 0.0), (0.5, 1.0, 0.0)],
            Interpolation::Hermite,
        )?);
        bonus.set_speed_variance(0.5);
        bonus.set_amplitude_variance(0.15);
        bonus.set_speed(1.0);

        let mut activity = Self {
            rng: StdRng::seed_from_u64(seed),
            hj,
            bonus,
            timers: TimerManager::new(),
        };
        activity.speed_change();
        Ok(activity)
    }

    fn speed_change(&mut self) {
        let speed = random_in_range(&mut self.rng, 0.3..=3.0);
        let rate = random_in_range(&mut self.rng, 0.05..=0.3);
        let next = random_in_range(&mut self.rng, 1.0..=20.0);
        self.hj.set_target_speed(speed, rate);
        if self.timers.add_timer(Timer::SpeedChange, next).is_some() {
            self.speed_change();
        }
    }

    fn maybe_start_bonus(&mut self, delta: f64, timer: Timer, other: Timer) {
        let probability = BONUS_EVENTS_PER_MINUTE * delta / 60.0;
        if chance(&mut self.rng, probability) && !self.timers.has_timer(&other) {
            let speed = random_in_range(&mut self.rng, 1.5..=5.0);
            self.bonus.set_speed(speed);
            let duration = random_in_range(&mut self.rng, 10.0..=25.0);
            log::debug!("bonus {timer:?} at speed {speed:.2} for {duration:.1}s");
            let fired = self.timers.add_timer(timer, duration);
            debug_assert!(fired.is_none());
        }
    }
}

impl Simulation for LuxuryHj {
    fn display_name(&self) -> &'static str {
        ActivityKind::LuxuryHj.display_name()
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        for timer in self.timers.update(delta)? {
            if timer == Timer::SpeedChange {
                self.speed_change();
            }
        }
        self.hj.update(delta)?;
        self.bonus.update(delta)?;
        self.maybe_start_bonus(delta, Timer::BonusA, Timer::BonusB);
        self.maybe_start_bonus(delta, Timer::BonusB, Timer::BonusA);
        Ok(())
    }

    fn try_pulse(&self) -> Result<Pulse> {
        let position = self.hj.position("hj", false)?;
        let (mut amp_a, mut amp_b) =
            positional_effect(self.hj.current_amplitude(), position, 1.0);
        let base_freq = position * (END_FREQ - START_FREQ) + START_FREQ;
        let mut freq_a = base_freq * 0.98;
        let mut freq_b = base_freq;

        let amp_bonus = self.bonus.position("bonus", true)?;
        let freq_bonus = amp_bonus * (BONUS_END_FREQ - BONUS_START_FREQ) + BONUS_START_FREQ;
        let blend = |bonus: f64, base: f64| bonus * BONUS_WEIGHT + base * (1.0 - BONUS_WEIGHT);

        if self.timers.has_timer(&Timer::BonusA) {
            amp_a = blend(amp_bonus, amp_a);
            freq_a = blend(freq_bonus, freq_a);
        }
        if self.timers.has_timer(&Timer::BonusB) {
            amp_b = blend(amp_bonus, amp_b);
            freq_b = blend(freq_bonus, freq_b);
        }
        Ok(Pulse::new(freq_a, freq_b, amp_a, amp_b))
    }
}
