//! Owners that turn absolute playback time into simulation steps.

use howl_core::activity::{Activity, ActivityKind, Simulation};
use howl_core::error::Result;
use howl_core::pulse::Pulse;
use howl_core::random::{chance, derive_seed};
use howl_core::source::PulseSource;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Converts absolute times into forward deltas.
///
/// The first call, and any call that goes back in time, yields zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct Clock {
    last: Option<f64>,
}

impl Clock {
    pub fn delta(&mut self, time: f64) -> f64 {
        let delta = match self.last {
            Some(last) if last <= time => time - last,
            _ => 0.0,
        };
        self.last = Some(time);
        delta
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Runs one activity at a time and occasionally swaps it for another.
///
/// Fields:
/// - `current`: the live activity, dropped outright on every switch
/// - `change_probability`: 0..=1, a value of 1 averages three switches a minute
/// - `simulation_clock` / `update_clock`: separate delta trackers for pulses and state
///
/// Typical usage:
/// - `ActivityHost::new(seed)` picks a random non-calibration activity
/// - a [`Player`](crate::player::Player) pulls pulses through [`PulseSource`]
#[derive(Debug)]
pub struct ActivityHost {
    rng: StdRng,
    seed: u64,
    instances: u64,
    current: Activity,
    change_probability: f64,
    simulation_clock: Clock,
    update_clock: Clock,
}

impl ActivityHost {
    pub fn new(seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let kind = pick_switch_target(&mut rng, None);
        Self::build(rng, seed, kind)
    }

    pub fn with_activity(seed: u64, kind: ActivityKind) -> Result<Self> {
        Self::build(StdRng::seed_from_u64(seed), seed, kind)
    }

    fn build(rng: StdRng, seed: u64, kind: ActivityKind) -> Result<Self> {
        let current = kind.instantiate(derive_seed(seed, 1))?;
        log::info!("activity: {}", kind.display_name());
        Ok(Self {
            rng,
            seed,
            instances: 1,
            current,
            change_probability: 0.5,
            simulation_clock: Clock::default(),
            update_clock: Clock::default(),
        })
    }

    pub fn current(&self) -> &Activity {
        &self.current
    }

    pub fn current_kind(&self) -> ActivityKind {
        self.current.kind()
    }

    pub fn change_probability(&self) -> f64 {
        self.change_probability
    }

    pub fn set_change_probability(&mut self, probability: f64) {
        self.change_probability = probability.max(0.0);
    }

    /// Replace the current activity with a fresh instance of `kind`.
    pub fn set_activity(&mut self, kind: ActivityKind) -> Result<()> {
        self.instances += 1;
        self.current = kind.instantiate(derive_seed(self.seed, self.instances))?;
        self.simulation_clock.reset();
        self.update_clock.reset();
        log::info!("activity: {}", kind.display_name());
        Ok(())
    }

    /// Switch to a random activity other than the current one, never a
    /// calibration activity.
    pub fn change_activity(&mut self) -> Result<()> {
        let kind = pick_switch_target(&mut self.rng, Some(self.current.kind()));
        self.set_activity(kind)
    }
}

fn pick_switch_target(rng: &mut StdRng, current: Option<ActivityKind>) -> ActivityKind {
    let candidates: Vec<ActivityKind> = ActivityKind::ALL
        .into_iter()
        .filter(|kind| !kind.is_calibration() && Some(*kind) != current)
        .collect();
    candidates.choose(rng).copied().unwrap_or(ActivityKind::Lick)
}

impl PulseSource for ActivityHost {
    fn display_name(&self) -> &str {
        "Activity output"
    }

    fn duration(&self) -> Option<f64> {
        None
    }

    fn is_finite(&self) -> bool {
        false
    }

    fn should_loop(&self) -> bool {
        false
    }

    fn ready_to_play(&self) -> bool {
        true
    }

    fn pulse_at_time(&mut self, time: f64) -> Pulse {
        let delta = self.simulation_clock.delta(time);
        if let Err(err) = self.current.run_simulation(delta) {
            log::error!("{} failed to advance: {err}", self.current.display_name());
            return Pulse::ZERO;
        }
        self.current.pulse()
    }

    fn update_state(&mut self, time: f64) {
        let delta = self.update_clock.delta(time);
        let probability = self.change_probability * 3.0 * delta / 60.0;
        if chance(&mut self.rng, probability) {
            if let Err(err) = self.change_activity() {
                log::error!("activity switch failed: {err}");
            }
        }
    }
}

/// Hosts any [`Simulation`] as an endless pulse source.
#[derive(Debug)]
pub struct SimulationSource<S> {
    simulation: S,
    clock: Clock,
}

impl<S: Simulation> SimulationSource<S> {
    pub fn new(simulation: S) -> Self {
        Self {
            simulation,
            clock: Clock::default(),
        }
    }

    pub fn simulation(&self) -> &S {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut S {
        &mut self.simulation
    }

    pub fn into_inner(self) -> S {
        self.simulation
    }
}

impl<S: Simulation> PulseSource for SimulationSource<S> {
    fn display_name(&self) -> &str {
        self.simulation.display_name()
    }

    fn duration(&self) -> Option<f64> {
        None
    }

    fn is_finite(&self) -> bool {
        false
    }

    fn should_loop(&self) -> bool {
        false
    }

    fn ready_to_play(&self) -> bool {
        true
    }

    fn pulse_at_time(&mut self, time: f64) -> Pulse {
        let delta = self.clock.delta(time);
        if let Err(err) = self.simulation.run_simulation(delta) {
            log::error!("{} failed to advance: {err}", self.simulation.display_name());
            return Pulse::ZERO;
        }
        self.simulation.pulse()
    }

    fn update_state(&mut self, _time: f64) {}
}
