use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{bidirectional_lick, unidirectional_lick, ActivityKind, Simulation};
use crate::error::Result;
use crate::math::{positional_effect, scale_velocity};
use crate::pulse::Pulse;
use crate::random::{derive_seed, random_in_range};
use crate::wave_manager::WaveManager;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LickType {
    Bidirectional,
    Unidirectional,
}

impl LickType {
    fn wave_name(self) -> &'static str {
        match self {
            LickType::Bidirectional => "bidirectional",
            LickType::Unidirectional => "unidirectional",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LickFinished;

/// Endless series of licks, each with its own path, speed and repetitions.
///
/// Longer licks run slower: the top speed is `4.5 - 3 * distance`.
#[derive(Debug)]
pub struct Lick {
    rng: StdRng,
    wave: WaveManager<LickFinished>,
    lick_type: LickType,
    start: f64,
    end: f64,
}

impl Lick {
    pub fn new(seed: u64) -> Result<Self> {
        let mut wave = WaveManager::new(derive_seed(seed, 1));
        wave.add_wave(bidirectional_lick()?);
        wave.add_wave(unidirectional_lick()?);
        wave.set_amplitude_variance(0.5);
        wave.set_speed_variance(0.5);

        let mut lick = Self {
            rng: StdRng::seed_from_u64(seed),
            wave,
            lick_type: LickType::Bidirectional,
            start: 0.0,
            end: 1.0,
        };
        lick.new_lick();
        Ok(lick)
    }

    fn new_lick(&mut self) {
        self.lick_type = if self.rng.gen_bool(0.5) {
            LickType::Bidirectional
        } else {
            LickType::Unidirectional
        };
        self.start = self.rng.gen::<f64>();
        self.end = self.rng.gen::<f64>();
        let distance = (self.end - self.start).abs();
        let max_speed = 4.5 - 3.0 * distance;
        let speed = random_in_range(&mut self.rng, 0.3..=max_speed);
        let desired_duration = random_in_range(&mut self.rng, 1.0..=5.0);
        let repetitions = ((desired_duration * speed) as u32).max(1);

        log::debug!(
            "lick {:?} {:.2}->{:.2} speed {speed:.2} x{repetitions}",
            self.lick_type,
            self.start,
            self.end
        );
        self.wave.restart();
        self.wave.set_speed(speed);
        self.wave.stop_after_iterations(repetitions, LickFinished);
    }
}

impl Simulation for Lick {
    fn display_name(&self) -> &'static str {
        ActivityKind::Lick.display_name()
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        for _finished in self.wave.update(delta)? {
            self.new_lick();
        }
        Ok(())
    }

    fn try_pulse(&self) -> Result<Pulse> {
        let (position, velocity) = self
            .wave
            .position_and_velocity(self.lick_type.wave_name(), true)?;
        let lick_position = (self.end - self.start) * position + self.start;
        let scaled_velocity = scale_velocity(velocity, 0.1);
        let (amp_a, amp_b) = positional_effect(scaled_velocity, lick_position, 1.0);
        Ok(Pulse::new(
            lick_position * 0.5 + 0.5,
            lick_position * 0.52 + 0.48,
            amp_a,
            amp_b,
        ))
    }
}
