//! Self-scheduling stimulation activities built on the wave toolkit.
//!
//! Each activity owns its waves, smoothed values, timers and random
//! generator. Driving one is two calls per tick: [`Simulation::run_simulation`]
//! with the elapsed seconds, then [`Simulation::pulse`] to read the result.
//! Activities are constructed from a seed so a run can be replayed exactly.

mod additive;
mod bj;
mod calibration;
mod chaos;
mod fast_slow;
mod lick;
mod luxury_hj;
mod milker;
mod opposites;
mod penetration;
mod vibro;

pub use additive::Additive;
pub use bj::{Bj, BjStage};
pub use calibration::{Calibration1, Calibration2, CalibrationPhase};
pub use chaos::Chaos;
pub use fast_slow::FastSlow;
pub use lick::Lick;
pub use luxury_hj::LuxuryHj;
pub use milker::Milker;
pub use opposites::Opposites;
pub use penetration::Penetration;
pub use vibro::Vibro;

use crate::error::Result;
use crate::pulse::Pulse;
use crate::shapes::TMAX;
use crate::wave::{Interpolation, WaveShape};

/// Behaviour shared by everything that synthesises pulses from elapsed time.
pub trait Simulation {
    fn display_name(&self) -> &'static str;

    /// Advance internal state by `delta` seconds. Negative deltas are rejected.
    fn run_simulation(&mut self, delta: f64) -> Result<()>;

    /// Derive the pulse for the current state.
    fn try_pulse(&self) -> Result<Pulse>;

    /// Like [`try_pulse`](Self::try_pulse) but falls back to silence.
    fn pulse(&self) -> Pulse {
        self.try_pulse().unwrap_or_else(|err| {
            log::error!("{}: no pulse available ({err}), sending silence", self.display_name());
            Pulse::ZERO
        })
    }
}

/// The fixed catalog of activities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Lick,
    Penetration,
    Vibro,
    Milker,
    Chaos,
    LuxuryHj,
    Opposites,
    Calibration1,
    Calibration2,
    Bj,
    FastSlow,
    Additive,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 12] = [
        ActivityKind::Lick,
        ActivityKind::Penetration,
        ActivityKind::Vibro,
        ActivityKind::Milker,
        ActivityKind::Chaos,
        ActivityKind::LuxuryHj,
        ActivityKind::Opposites,
        ActivityKind::Calibration1,
        ActivityKind::Calibration2,
        ActivityKind::Bj,
        ActivityKind::FastSlow,
        ActivityKind::Additive,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ActivityKind::Lick => "Infinite licks",
            ActivityKind::Penetration => "Penetration",
            ActivityKind::Vibro => "Sliding vibrator",
            ActivityKind::Milker => "Milkmaster 3000",
            ActivityKind::Chaos => "Chaos",
            ActivityKind::LuxuryHj => "Luxury HJ",
            ActivityKind::Opposites => "Opposites",
            ActivityKind::Calibration1 => "Calibration 1",
            ActivityKind::Calibration2 => "Calibration 2",
            ActivityKind::Bj => "BJ megamix",
            ActivityKind::FastSlow => "Fast/slow",
            ActivityKind::Additive => "Additive",
        }
    }

    /// Calibration activities are never picked by random switching.
    pub fn is_calibration(self) -> bool {
        matches!(self, ActivityKind::Calibration1 | ActivityKind::Calibration2)
    }

    /// Look up a kind by display name or by its identifier, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| {
            kind.display_name().eq_ignore_ascii_case(name)
                || format!("{kind:?}").eq_ignore_ascii_case(name)
        })
    }

    /// Build a fresh instance of this activity.
    pub fn instantiate(self, seed: u64) -> Result<Activity> {
        Ok(match self {
            ActivityKind::Lick => Activity::Lick(Lick::new(seed)?),
            ActivityKind::Penetration => Activity::Penetration(Penetration::new(seed)?),
            ActivityKind::Vibro => Activity::Vibro(Vibro::new(seed)),
            ActivityKind::Milker => Activity::Milker(Milker::new(seed)?),
            ActivityKind::Chaos => Activity::Chaos(Chaos::new(seed)),
            ActivityKind::LuxuryHj => Activity::LuxuryHj(LuxuryHj::new(seed)?),
            ActivityKind::Opposites => Activity::Opposites(Opposites::new(seed)),
            ActivityKind::Calibration1 => Activity::Calibration1(Calibration1::new(seed)?),
            ActivityKind::Calibration2 => Activity::Calibration2(Calibration2::new(seed)?),
            ActivityKind::Bj => Activity::Bj(Bj::new(seed)?),
            ActivityKind::FastSlow => Activity::FastSlow(FastSlow::new(seed)?),
            ActivityKind::Additive => Activity::Additive(Additive::new(seed)?),
        })
    }
}

/// A constructed activity of any kind.
#[derive(Debug)]
pub enum Activity {
    Lick(Lick),
    Penetration(Penetration),
    Vibro(Vibro),
    Milker(Milker),
    Chaos(Chaos),
    LuxuryHj(LuxuryHj),
    Opposites(Opposites),
    Calibration1(Calibration1),
    Calibration2(Calibration2),
    Bj(Bj),
    FastSlow(FastSlow),
    Additive(Additive),
}

macro_rules! each_activity {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Activity::Lick($inner) => $body,
            Activity::Penetration($inner) => $body,
            Activity::Vibro($inner) => $body,
            Activity::Milker($inner) => $body,
            Activity::Chaos($inner) => $body,
            Activity::LuxuryHj($inner) => $body,
            Activity::Opposites($inner) => $body,
            Activity::Calibration1($inner) => $body,
            Activity::Calibration2($inner) => $body,
            Activity::Bj($inner) => $body,
            Activity::FastSlow($inner) => $body,
            Activity::Additive($inner) => $body,
        }
    };
}

impl Activity {
    pub fn kind(&self) -> ActivityKind {
        match self {
            Activity::Lick(_) => ActivityKind::Lick,
            Activity::Penetration(_) => ActivityKind::Penetration,
            Activity::Vibro(_) => ActivityKind::Vibro,
            Activity::Milker(_) => ActivityKind::Milker,
            Activity::Chaos(_) => ActivityKind::Chaos,
            Activity::LuxuryHj(_) => ActivityKind::LuxuryHj,
            Activity::Opposites(_) => ActivityKind::Opposites,
            Activity::Calibration1(_) => ActivityKind::Calibration1,
            Activity::Calibration2(_) => ActivityKind::Calibration2,
            Activity::Bj(_) => ActivityKind::Bj,
            Activity::FastSlow(_) => ActivityKind::FastSlow,
            Activity::Additive(_) => ActivityKind::Additive,
        }
    }
}

impl Simulation for Activity {
    fn display_name(&self) -> &'static str {
        self.kind().display_name()
    }

    fn run_simulation(&mut self, delta: f64) -> Result<()> {
        each_activity!(self, inner => inner.run_simulation(delta))
    }

    fn try_pulse(&self) -> Result<Pulse> {
        each_activity!(self, inner => inner.try_pulse())
    }
}

/// Out-and-back stroke peaking mid-cycle.
pub(crate) fn bidirectional_lick() -> Result<WaveShape> {
    WaveShape::from_triples(
        "bidirectional",
        &[(0.0, 0.0, 0.0), (0.5, 1.0, 0.0)],
        Interpolation::Hermite,
    )
}

/// Single stroke that snaps back at the cycle boundary.
pub(crate) fn unidirectional_lick() -> Result<WaveShape> {
    WaveShape::from_triples(
        "unidirectional",
        &[(0.0, 0.0, 0.0), (TMAX, 1.0, 0.0)],
        Interpolation::Hermite,
    )
}
