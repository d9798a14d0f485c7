//! Fixed, predictable patterns for checking electrode placement and levels.

use super::{ActivityKind, Simulation};
use crate::error::Result;
use crate::math::positional_effect;
use crate::pulse::Pulse;
use crate::timer::TimerManager;
use crate::wave::{Interpolation, WaveShape};
use crate::wave_manager::WaveManager;

const WAVE_SPEED: f64 = 0.25;
const WAVE_POWER: f64 = 0.9;
const WAVE_FREQUENCY: f64 = 0.5;
const PHASE_CHANGE_SECS: f64 = 16.0;

fn calibration_wave(seed: u64) -> Result<WaveManager> {
    let mut wave = WaveManager::new(seed);
    wave.add_wave(WaveShape::from_triples(
        "calibration",
        &[(0.0, 0.0, 0.0), (0.5, 1.0, 0.0)],
        Interpolation::Hermite,
    )?);
    wave.set_speed(WAVE_SPEED);
    Ok(wave)
}

/// Slow pan between the channels at a fixed mid frequency.
#[derive(Debug)]
pub struct Calibration1 {
    wave: WaveManager,
}

impl Calibration1 {
    pub fn new(seed: u64) -> Result<Self> {
        Ok(Self {
            wave: calibration_wave(seed)?,
        })
    }
}

impl Simulation for Calibration1 {
    fn display_name(&self) -> &'static str {
        ActivityKind::Calibration1.display_name()
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        self.wave.update(delta)?;
        Ok(())
    }

    fn try_pulse(&self) -> Result<Pulse> {
        let position = self.wave.position("calibration", true)?;
        let (amp_a, amp_b) = positional_effect(WAVE_POWER, position, 1.0);
        Ok(Pulse::new(WAVE_FREQUENCY, WAVE_FREQUENCY, amp_a, amp_b))
    }
}

/// Which channels [`Calibration2`] is currently driving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationPhase {
    ChannelA,
    ChannelB,
    Both,
}

impl CalibrationPhase {
    pub fn next(self) -> Self {
        match self {
            CalibrationPhase::ChannelA => CalibrationPhase::ChannelB,
            CalibrationPhase::ChannelB => CalibrationPhase::Both,
            CalibrationPhase::Both => CalibrationPhase::ChannelA,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct NextPhase;

/// Frequency sweep on channel A, then B, then both, 16 seconds each.
#[derive(Debug)]
pub struct Calibration2 {
    wave: WaveManager,
    timers: TimerManager<NextPhase>,
    phase: CalibrationPhase,
}

impl Calibration2 {
    pub fn new(seed: u64) -> Result<Self> {
        let mut timers = TimerManager::new();
        let fired = timers.add_timer(NextPhase, PHASE_CHANGE_SECS);
        debug_assert!(fired.is_none());
        Ok(Self {
            wave: calibration_wave(seed)?,
            timers,
            phase: CalibrationPhase::ChannelA,
        })
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }
}

impl Simulation for Calibration2 {
    fn display_name(&self) -> &'static str {
        ActivityKind::Calibration2.display_name()
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        for _ in self.timers.update(delta)? {
            self.phase = self.phase.next();
            let fired = self.timers.add_timer(NextPhase, PHASE_CHANGE_SECS);
            debug_assert!(fired.is_none());
        }
        self.wave.update(delta)?;
        Ok(())
    }

    fn try_pulse(&self) -> Result<Pulse> {
        let frequency = self.wave.position("calibration", true)?;
        let amp_a = if self.phase == CalibrationPhase::ChannelB {
            0.0
        } else {
            WAVE_POWER
        };
        let amp_b = if self.phase == CalibrationPhase::ChannelA {
            0.0
        } else {
            WAVE_POWER
        };
        Ok(Pulse::new(frequency, frequency, amp_a, amp_b))
    }
}
