use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{bidirectional_lick, unidirectional_lick, ActivityKind, Simulation};
use crate::error::Result;
use crate::math::{
    engulf_effect, positional_effect, scale_between, scale_velocity, FrequencyConverter,
    FrequencyCurve,
};
use crate::pulse::Pulse;
use crate::random::{derive_seed, random_in_range};
use crate::timer::TimerManager;
use crate::wave::{Interpolation, WaveShape};
use crate::wave_manager::WaveManager;

const LICK_FREQUENCY: (f64, f64) = (0.8, 1.0);

/// Stages of [`Bj`], each with its own wave and shaping law.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BjStage {
    FullLick,
    TipLick,
    Suck,
    Deepthroat,
}

impl BjStage {
    pub const ALL: [BjStage; 4] = [
        BjStage::FullLick,
        BjStage::TipLick,
        BjStage::Suck,
        BjStage::Deepthroat,
    ];

    fn is_lick(self) -> bool {
        matches!(self, BjStage::FullLick | BjStage::TipLick)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Timer {
    SpeedChange,
    NextStage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct StageFinished;

/// Four-stage cycle of licks and sucks.
///
/// Stages are drawn at random, never repeating back to back. Lick stages last
/// 6 to 20 seconds at a fixed speed; suck stages last 20 to 60 seconds with a
/// wandering speed. A stage ends at the first cycle boundary after its timer.
#[derive(Debug)]
pub struct Bj {
    rng: StdRng,
    wave: WaveManager<StageFinished>,
    timers: TimerManager<Timer>,
    stage: BjStage,
    deepthroat_frequency: FrequencyConverter,
    suck_frequency_a: FrequencyConverter,
    suck_frequency_b: FrequencyConverter,
}

impl Bj {
    pub fn new(seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut wave = WaveManager::new(derive_seed(seed, 1));
        wave.add_wave(WaveShape::from_triples(
            "position",
            &[(0.0, 0.0, 0.0), (0.35, 1.0, 0.0)],
            Interpolation::Hermite,
        )?);
        wave.add_wave(bidirectional_lick()?);
        wave.add_wave(unidirectional_lick()?);

        let stage = *BjStage::ALL.choose(&mut rng).unwrap_or(&BjStage::FullLick);
        let mut bj = Self {
            rng,
            wave,
            timers: TimerManager::new(),
            stage,
            deepthroat_frequency: FrequencyConverter::new(
                &[(0.0, 1.0), (0.7, 0.0), (1.0, 0.3)],
                FrequencyCurve::Smoothstep,
            )?,
            suck_frequency_a: FrequencyConverter::new(
                &[(0.0, 0.7), (1.0, 0.3)],
                FrequencyCurve::Smoothstep,
            )?,
            suck_frequency_b: FrequencyConverter::new(
                &[(0.0, 0.9), (1.0, 0.3)],
                FrequencyCurve::Smoothstep,
            )?,
        };
        bj.next_stage();
        Ok(bj)
    }

    pub fn stage(&self) -> BjStage {
        self.stage
    }

    fn next_stage(&mut self) {
        let previous = self.stage;
        while self.stage == previous {
            self.stage = *BjStage::ALL.choose(&mut self.rng).unwrap_or(&previous);
        }

        let duration = if self.stage.is_lick() {
            random_in_range(&mut self.rng, 6.0..=20.0)
        } else {
            random_in_range(&mut self.rng, 20.0..=60.0)
        };
        log::debug!("bj stage {:?} for {duration:.1}s", self.stage);

        self.wave.restart();
        self.wave.set_amplitude_variance_ease_in(0.0);
        match self.stage {
            BjStage::FullLick | BjStage::TipLick => {
                let speeds = if self.stage == BjStage::FullLick {
                    0.3..=1.0
                } else {
                    0.5..=3.0
                };
                self.wave.set_speed_variance(0.4);
                self.wave.set_amplitude_variance(0.3);
                let speed = random_in_range(&mut self.rng, speeds);
                self.wave.set_speed(speed);
                self.timers.cancel_timer(&Timer::SpeedChange);
            }
            BjStage::Suck | BjStage::Deepthroat => {
                self.wave.set_speed_variance(0.2);
                self.wave.set_amplitude_variance(0.2);
                let speed = random_in_range(&mut self.rng, 0.2..=1.2);
                self.wave.set_speed(speed);
                self.speed_change();
            }
        }
        self.schedule(Timer::NextStage, duration);
    }

    fn speed_change(&mut self) {
        let speed = random_in_range(&mut self.rng, 0.2..=1.2);
        let rate = random_in_range(&mut self.rng, 0.03..=0.2);
        self.wave.set_target_speed(speed, rate);
        let next = random_in_range(&mut self.rng, 1.0..=20.0);
        self.schedule(Timer::SpeedChange, next);
    }

    fn on_timer(&mut self, timer: Timer) {
        match timer {
            Timer::SpeedChange => self.speed_change(),
            Timer::NextStage => self.wave.stop_at_end_of_cycle(StageFinished),
        }
    }

    fn schedule(&mut self, timer: Timer, seconds: f64) {
        if let Some(fired) = self.timers.add_timer(timer, seconds) {
            self.on_timer(fired);
        }
    }

    fn lick_pulse(&self, wave: &str, tip: bool) -> Result<Pulse> {
        let (position, velocity) = self.wave.position_and_velocity(wave, true)?;
        let pan_position = if tip {
            scale_between(position, 0.6, 1.0)
        } else {
            position
        };
        let scaled_velocity = scale_velocity(velocity, 0.1);
        let (amp_a, amp_b) = positional_effect(scaled_velocity, pan_position, 1.0);
        let freq_b = scale_between(position, LICK_FREQUENCY.0, LICK_FREQUENCY.1);
        Ok(Pulse::new(freq_b - 0.1, freq_b, amp_a, amp_b))
    }
}

impl Simulation for Bj {
    fn display_name(&self) -> &'static str {
        ActivityKind::Bj.display_name()
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        for timer in self.timers.update(delta)? {
            self.on_timer(timer);
        }
        for _ in self.wave.update(delta)? {
            self.next_stage();
        }
        Ok(())
    }

    fn try_pulse(&self) -> Result<Pulse> {
        match self.stage {
            BjStage::FullLick => self.lick_pulse("unidirectional", false),
            BjStage::TipLick => self.lick_pulse("bidirectional", true),
            BjStage::Suck => {
                let position = self.wave.position("position", false)?;
                let (amp_a, amp_b) =
                    engulf_effect(self.wave.current_amplitude(), position, 0.7, 0.4);
                Ok(Pulse::new(
                    self.suck_frequency_a.frequency(position),
                    self.suck_frequency_b.frequency(position),
                    amp_a,
                    amp_b,
                ))
            }
            BjStage::Deepthroat => {
                let position = self.wave.position("position", false)?;
                let (amp_a, amp_b) =
                    engulf_effect(self.wave.current_amplitude(), position, 0.8, 0.3);
                Ok(Pulse::new(
                    position,
                    self.deepthroat_frequency.frequency(position),
                    amp_a,
                    amp_b,
                ))
            }
        }
    }
}
