use std::hash::Hash;

use fnv::FnvHashMap;
use smallvec::SmallVec;

use crate::error::{Result, SynthError};

#[derive(Clone, Copy, Debug)]
struct Countdown {
    initial: f64,
    remaining: f64,
}

/// Keys that expired during one [`TimerManager::update`] call, in firing order.
pub type Fired<K> = SmallVec<[K; 4]>;

/// A set of one-shot countdowns keyed by `K`.
///
/// The key doubles as the action to run when the timer fires: the owner
/// receives expired keys back from [`update`](Self::update) and dispatches
/// them, typically scheduling the next timer of the same key.
///
/// Typical usage:
/// - `add_timer(key, seconds)` to schedule (replacing any timer with that key)
/// - `update(dt)` every tick, then handle each returned key
/// - `proportion_elapsed(key)` to drive sweeps that follow a timer's progress
#[derive(Clone, Debug)]
pub struct TimerManager<K> {
    timers: FnvHashMap<K, Countdown>,
}

impl<K> Default for TimerManager<K> {
    fn default() -> Self {
        Self {
            timers: FnvHashMap::default(),
        }
    }
}

impl<K: Copy + Eq + Hash> TimerManager<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `key` to fire after `duration` seconds.
    ///
    /// A non-positive duration does not register anything; the key is handed
    /// straight back so the caller can run it now.
    #[must_use = "a timer with a non-positive duration fires immediately"]
    pub fn add_timer(&mut self, key: K, duration: f64) -> Option<K> {
        if duration <= 0.0 {
            return Some(key);
        }
        self.timers.insert(
            key,
            Countdown {
                initial: duration,
                remaining: duration,
            },
        );
        None
    }

    pub fn cancel_timer(&mut self, key: &K) {
        self.timers.remove(key);
    }

    pub fn has_timer(&self, key: &K) -> bool {
        self.timers.contains_key(key)
    }

    pub fn remaining_time(&self, key: &K) -> Option<f64> {
        self.timers.get(key).map(|t| t.remaining)
    }

    pub fn elapsed_time(&self, key: &K) -> Option<f64> {
        self.timers.get(key).map(|t| t.initial - t.remaining)
    }

    /// Fraction of the timer's original duration that has passed.
    pub fn proportion_elapsed(&self, key: &K) -> Option<f64> {
        self.timers
            .get(key)
            .map(|t| (t.initial - t.remaining) / t.initial)
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Count every timer down by `delta` seconds and collect the ones that expire.
    ///
    /// Expired timers are removed before being returned, so handlers may
    /// re-register the same key.
    pub fn update(&mut self, delta: f64) -> Result<Fired<K>> {
        if delta < 0.0 {
            return Err(SynthError::NegativeDelta(delta));
        }
        let keys: SmallVec<[K; 8]> = self.timers.keys().copied().collect();
        let mut fired = Fired::new();
        for key in keys {
            let expired = match self.timers.get_mut(&key) {
                Some(timer) => {
                    timer.remaining -= delta;
                    timer.remaining <= 0.0
                }
                None => false,
            };
            if expired {
                self.timers.remove(&key);
                fired.push(key);
            }
        }
        Ok(fired)
    }
}
