use crate::error::{Result, SynthError};
use crate::math::smoothstep;

/// How long a [`SmoothedValue`] takes to reach a new target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transition {
    /// Units per second. The duration is `|target - start| / rate`.
    Rate(f64),
    /// Fixed duration in seconds, ignored when the value is already there.
    Duration(f64),
}

/// A scalar that eases toward its target with a smoothstep curve.
///
/// An optional completion event of type `E` is held while a transition runs
/// and handed back exactly once when it finishes, either from
/// [`set_target_then`](Self::set_target_then) when no transition is needed or
/// from [`update`](Self::update).
#[derive(Clone, Debug)]
pub struct SmoothedValue<E = ()> {
    start: f64,
    target: f64,
    elapsed: f64,
    duration: f64,
    on_reached: Option<E>,
}

impl<E> SmoothedValue<E> {
    pub fn new(initial: f64) -> Self {
        Self {
            start: initial,
            target: initial,
            elapsed: 0.0,
            duration: 0.0,
            on_reached: None,
        }
    }

    /// Current eased value.
    pub fn current(&self) -> f64 {
        if !self.is_transitioning() {
            return self.target;
        }
        let t = smoothstep(self.elapsed / self.duration);
        self.start + (self.target - self.start) * t
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_transitioning(&self) -> bool {
        self.duration > 0.0 && self.elapsed < self.duration
    }

    /// Jump straight to `value`, dropping any pending completion event.
    pub fn set_immediately(&mut self, value: f64) {
        self.start = value;
        self.target = value;
        self.elapsed = 0.0;
        self.duration = 0.0;
        self.on_reached = None;
    }

    /// Start a transition toward `target` without a completion event.
    pub fn set_target(&mut self, target: f64, transition: Transition) {
        self.begin(target, transition);
        self.on_reached = None;
    }

    /// Start a transition toward `target` and arm `on_reached`.
    ///
    /// Returns the event straight back when the transition is already
    /// complete, in which case it will not be returned again by `update`.
    #[must_use = "an immediately completed transition returns its event here"]
    pub fn set_target_then(&mut self, target: f64, transition: Transition, on_reached: E) -> Option<E> {
        self.begin(target, transition);
        if self.is_transitioning() {
            self.on_reached = Some(on_reached);
            None
        } else {
            self.on_reached = None;
            Some(on_reached)
        }
    }

    fn begin(&mut self, target: f64, transition: Transition) {
        let start = self.current();
        let difference = (target - start).abs();
        self.start = start;
        self.target = target;
        self.elapsed = 0.0;
        self.duration = match transition {
            Transition::Rate(rate) if rate > 0.0 => difference / rate,
            Transition::Rate(_) => 0.0,
            Transition::Duration(duration) if difference > 0.0 => duration.max(0.0),
            Transition::Duration(_) => 0.0,
        };
    }

    /// Advance the transition by `delta` seconds.
    ///
    /// Returns the completion event on the tick the transition finishes.
    pub fn update(&mut self, delta: f64) -> Result<Option<E>> {
        if delta < 0.0 {
            return Err(SynthError::NegativeDelta(delta));
        }
        if !self.is_transitioning() {
            return Ok(None);
        }
        self.elapsed += delta;
        if self.is_transitioning() {
            Ok(None)
        } else {
            Ok(self.on_reached.take())
        }
    }
}
