use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ActivityKind, Simulation};
use crate::error::Result;
use crate::math::positional_effect;
use crate::pulse::Pulse;
use crate::random::{derive_seed, random_in_range};
use crate::shapes::TMAX;
use crate::timer::TimerManager;
use crate::wave::{Interpolation, WaveShape};
use crate::wave_manager::WaveManager;

const WOMP_START_FREQ: f64 = 0.0;
const WOMP_END_FREQ: f64 = 0.7;
const WOMP_START_SPEED: f64 = 0.3;
const WOMP_END_SPEED: f64 = 2.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Womp,
    Buzz,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WompEvent {
    PeakSpeed,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct BuzzEnd;

/// Accelerating "womp" strokes alternating with a steady frequency-sweeping buzz.
#[derive(Debug)]
pub struct Milker {
    rng: StdRng,
    wave: WaveManager<WompEvent>,
    timers: TimerManager<BuzzEnd>,
    stage: Stage,
    reverse_womp: bool,
    buzz_freq_a: (f64, f64),
    buzz_freq_b: (f64, f64),
}

impl Milker {
    pub fn new(seed: u64) -> Result<Self> {
        let mut wave = WaveManager::new(derive_seed(seed, 1));
        wave.add_wave(WaveShape::from_triples(
            "womp",
            &[(0.0, 1.0, 0.0), (TMAX, 0.0, 0.0)],
            Interpolation::Hermite,
        )?);
        wave.add_wave(WaveShape::from_triples(
            "buzz",
            &[(0.0, 0.0, 0.0), (0.5, 1.0, 0.0)],
            Interpolation::Hermite,
        )?);

        let mut milker = Self {
            rng: StdRng::seed_from_u64(seed),
            wave,
            timers: TimerManager::new(),
            stage: Stage::Womp,
            reverse_womp: false,
            buzz_freq_a: (0.75, 0.75),
            buzz_freq_b: (0.75, 0.75),
        };
        milker.womp_start();
        Ok(milker)
    }

    fn womp_start(&mut self) {
        self.stage = Stage::Womp;
        self.wave.restart();
        let rate = random_in_range(&mut self.rng, 0.1..=0.15);
        self.reverse_womp = self.rng.gen_bool(0.5);
        self.wave.set_speed(WOMP_START_SPEED);
        if let Some(event) = self
            .wave
            .set_target_speed_then(WOMP_END_SPEED, rate, WompEvent::PeakSpeed)
        {
            self.on_wave_event(event);
        }
    }

    fn buzz_start(&mut self) {
        self.stage = Stage::Buzz;
        self.buzz_freq_a = (
            random_in_range(&mut self.rng, 0.0..=0.3),
            random_in_range(&mut self.rng, 0.0..=0.3),
        );
        self.buzz_freq_b = (
            random_in_range(&mut self.rng, 0.7..=1.0),
            random_in_range(&mut self.rng, 0.7..=1.0),
        );
        let speed = random_in_range(&mut self.rng, 0.4..=0.8);
        self.wave.restart();
        self.wave.set_speed(speed);
        let duration = random_in_range(&mut self.rng, 6.0..=12.0);
        if self.timers.add_timer(BuzzEnd, duration).is_some() {
            self.womp_start();
        }
    }

    fn on_wave_event(&mut self, event: WompEvent) {
        match event {
            WompEvent::PeakSpeed => self.wave.stop_at_end_of_cycle(WompEvent::Finished),
            WompEvent::Finished => self.buzz_start(),
        }
    }
}

impl Simulation for Milker {
    fn display_name(&self) -> &'static str {
        ActivityKind::Milker.display_name()
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        for _ in self.timers.update(delta)? {
            self.womp_start();
        }
        let events = self.wave.update_with(delta, |wave, event| {
            if event == WompEvent::PeakSpeed {
                wave.stop_at_end_of_cycle(WompEvent::Finished);
            }
        })?;
        for event in events {
            self.on_wave_event(event);
        }
        Ok(())
    }

    fn try_pulse(&self) -> Result<Pulse> {
        match self.stage {
            Stage::Womp => {
                let position = self.wave.position("womp", true)?;
                let adjusted = if self.reverse_womp {
                    1.0 - position
                } else {
                    position
                };
                let (amp_a, amp_b) = positional_effect(0.9, adjusted, 1.0);
                let freq = adjusted * (WOMP_END_FREQ - WOMP_START_FREQ) + WOMP_START_FREQ;
                Ok(Pulse::new(freq, freq, amp_a, amp_b))
            }
            Stage::Buzz => {
                let position = self.wave.position("buzz", true)?;
                let phase = self.timers.proportion_elapsed(&BuzzEnd).unwrap_or(1.0);
                let sweep = |(start, end): (f64, f64)| phase * (end - start) + start;
                let amp = 0.8 + 0.1 * position;
                Ok(Pulse::new(
                    sweep(self.buzz_freq_a),
                    sweep(self.buzz_freq_b),
                    amp,
                    amp,
                ))
            }
        }
    }
}
