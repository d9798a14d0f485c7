use fnv::FnvHashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use smallvec::SmallVec;

use crate::error::{Result, SynthError};
use crate::smoothed::{SmoothedValue, Transition};
use crate::variance::{VarianceHandler, VarianceKind};
use crate::wave::{CyclicalWave, WaveShape};

/// Events a [`WaveManager`] hands back from one update, in the order they occurred.
pub type WaveEvents<E> = SmallVec<[E; 2]>;

#[derive(Clone, Debug)]
struct PendingStop<E> {
    target: f64,
    event: E,
}

/// A set of named waves sharing one clock, speed, and amplitude.
///
/// Speed is a [`SmoothedValue`] so it can ramp toward a target; both speed
/// and amplitude carry a per-cycle [`VarianceHandler`]. The manager can be
/// told to stop at a future cycle boundary, at which point it pins its clock
/// to that boundary, reports the stop event once, and ignores updates until
/// [`restart`](Self::restart).
///
/// Fields:
/// - `current_time`: accumulated simulation time in cycles
/// - `last_cycle`: integer cycle index last seen, used to roll variance
/// - `rng`: private generator feeding both variance handlers
#[derive(Clone, Debug)]
pub struct WaveManager<E = ()> {
    waves: FnvHashMap<String, CyclicalWave>,
    current_time: f64,
    last_cycle: i64,
    base_amplitude: f64,
    base_speed: SmoothedValue<E>,
    amplitude_variance: VarianceHandler,
    speed_variance: VarianceHandler,
    pending_stop: Option<PendingStop<E>>,
    stopped: bool,
    rng: StdRng,
}

impl<E> WaveManager<E> {
    pub fn new(seed: u64) -> Self {
        Self {
            waves: FnvHashMap::default(),
            current_time: 0.0,
            last_cycle: 0,
            base_amplitude: 1.0,
            base_speed: SmoothedValue::new(1.0),
            amplitude_variance: VarianceHandler::new(VarianceKind::Attenuate),
            speed_variance: VarianceHandler::new(VarianceKind::Jitter),
            pending_stop: None,
            stopped: false,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Register `shape` under its own name, replacing any wave of that name.
    pub fn add_wave(&mut self, shape: WaveShape) {
        let name = shape.name().to_owned();
        self.insert_wave(name, shape);
    }

    /// Register `shape` under `name`, replacing any wave of that name.
    pub fn insert_wave(&mut self, name: impl Into<String>, shape: WaveShape) {
        self.waves.insert(name.into(), CyclicalWave::new(shape));
    }

    pub fn remove_wave(&mut self, name: &str) -> Option<CyclicalWave> {
        self.waves.remove(name)
    }

    pub fn wave(&self, name: &str) -> Result<&CyclicalWave> {
        self.waves
            .get(name)
            .ok_or_else(|| SynthError::WaveNotFound(name.to_owned()))
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    #[inline]
    fn phase(&self) -> f64 {
        self.current_time.rem_euclid(1.0)
    }

    /// Base amplitude scaled by this cycle's amplitude jitter.
    pub fn current_amplitude(&self) -> f64 {
        self.base_amplitude * self.amplitude_variance.factor(self.phase())
    }

    /// Smoothed base speed scaled by this cycle's speed jitter.
    pub fn current_speed(&self) -> f64 {
        self.base_speed.current() * self.speed_variance.factor(self.phase())
    }

    pub fn target_speed(&self) -> f64 {
        self.base_speed.target()
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.base_speed.set_immediately(speed);
    }

    /// Ramp the base speed toward `target` at `rate` units per second.
    pub fn set_target_speed(&mut self, target: f64, rate: f64) {
        self.base_speed.set_target(target, Transition::Rate(rate));
    }

    /// Ramp the base speed and report `on_reached` when it gets there.
    ///
    /// Returns the event immediately if no ramp is needed.
    #[must_use = "an already reached target speed returns its event here"]
    pub fn set_target_speed_then(&mut self, target: f64, rate: f64, on_reached: E) -> Option<E> {
        self.base_speed
            .set_target_then(target, Transition::Rate(rate), on_reached)
    }

    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.base_amplitude = amplitude;
    }

    pub fn set_amplitude_variance(&mut self, variance: f64) {
        self.amplitude_variance.set_variance(variance);
    }

    pub fn set_speed_variance(&mut self, variance: f64) {
        self.speed_variance.set_variance(variance);
    }

    pub fn set_amplitude_variance_ease_in(&mut self, ease_in: f64) {
        self.amplitude_variance.set_ease_in(ease_in);
    }

    pub fn set_speed_variance_ease_in(&mut self, ease_in: f64) {
        self.speed_variance.set_ease_in(ease_in);
    }

    /// Stop when the current cycle ends.
    pub fn stop_at_end_of_cycle(&mut self, on_stop: E) {
        self.stop_after_iterations(1, on_stop);
    }

    /// Stop at the cycle boundary `iterations` boundaries from now.
    pub fn stop_after_iterations(&mut self, iterations: u32, on_stop: E) {
        self.pending_stop = Some(PendingStop {
            target: (self.current_time + f64::from(iterations)).floor(),
            event: on_stop,
        });
    }

    /// Rewind the clock to zero and clear any stop, keeping waves and speed.
    pub fn restart(&mut self) {
        self.current_time = 0.0;
        self.pending_stop = None;
        self.stopped = false;
    }

    fn amplitude(&self, apply_variance: bool) -> f64 {
        if apply_variance {
            self.current_amplitude()
        } else {
            self.base_amplitude
        }
    }

    /// Sample wave `name` at the manager's clock, scaled by amplitude.
    pub fn position(&self, name: &str, apply_amplitude_variance: bool) -> Result<f64> {
        let wave = self.wave(name)?;
        Ok(self.amplitude(apply_amplitude_variance) * wave.position(self.current_time))
    }

    /// Like [`position`](Self::position) with velocity in units per second.
    pub fn position_and_velocity(
        &self,
        name: &str,
        apply_amplitude_variance: bool,
    ) -> Result<(f64, f64)> {
        let wave = self.wave(name)?;
        let amplitude = self.amplitude(apply_amplitude_variance);
        let (position, velocity) = wave.position_and_velocity(self.current_time);
        Ok((
            amplitude * position,
            amplitude * self.current_speed() * velocity,
        ))
    }

    /// Advance by `delta` seconds of wall time.
    ///
    /// Returns the speed-reached event (if the ramp finished) followed by the
    /// stop event (if the clock hit its stop target). A stop armed after this
    /// returns is measured from the advanced clock; use
    /// [`update_with`](Self::update_with) to react before the clock moves.
    pub fn update(&mut self, delta: f64) -> Result<WaveEvents<E>> {
        let mut reached = None;
        let mut events = self.update_with(delta, |_, event| reached = Some(event))?;
        if let Some(event) = reached {
            events.insert(0, event);
        }
        Ok(events)
    }

    /// Advance by `delta`, handing a finished speed ramp to `on_speed_reached`
    /// while the clock still reads the start of the tick.
    ///
    /// A stop armed from the handler targets the boundary after the old clock
    /// and is checked in this same tick. Returns only the stop event, if any.
    pub fn update_with<F>(&mut self, delta: f64, on_speed_reached: F) -> Result<WaveEvents<E>>
    where
        F: FnOnce(&mut Self, E),
    {
        if delta < 0.0 {
            return Err(SynthError::NegativeDelta(delta));
        }
        let mut events = WaveEvents::new();
        if self.stopped {
            return Ok(events);
        }
        if let Some(event) = self.base_speed.update(delta)? {
            on_speed_reached(self, event);
        }

        let delta_time = delta * self.current_speed();
        let next_time = self.current_time + delta_time;
        let cycle = next_time.floor() as i64;
        if cycle != self.last_cycle {
            self.last_cycle = cycle;
            self.amplitude_variance.apply_new_cycle(&mut self.rng);
            self.speed_variance.apply_new_cycle(&mut self.rng);
        }

        match self.pending_stop.take() {
            Some(stop) if next_time >= stop.target => {
                self.current_time = stop.target;
                self.stopped = true;
                events.push(stop.event);
            }
            pending => {
                self.pending_stop = pending;
                self.current_time = next_time;
            }
        }
        Ok(events)
    }
}
