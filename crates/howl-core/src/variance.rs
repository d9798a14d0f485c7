use rand::Rng;

/// Which jitter law a [`VarianceHandler`] draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarianceKind {
    /// `1 - U[0, v)`: only ever attenuates. Used for amplitude.
    Attenuate,
    /// `1 + U(-v, v)`: symmetric around 1. Used for speed.
    Jitter,
}

/// Per-cycle random multiplier, eased in from the previous cycle's value.
#[derive(Clone, Debug)]
pub struct VarianceHandler {
    kind: VarianceKind,
    variance: f64,
    ease_in: f64,
    previous: f64,
    current: f64,
}

impl VarianceHandler {
    pub fn new(kind: VarianceKind) -> Self {
        Self {
            kind,
            variance: 0.0,
            ease_in: 0.0,
            previous: 1.0,
            current: 1.0,
        }
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn set_variance(&mut self, variance: f64) {
        self.variance = variance.clamp(0.0, 1.0);
    }

    /// Fraction of a cycle over which a new factor blends in.
    pub fn set_ease_in(&mut self, ease_in: f64) {
        self.ease_in = ease_in.clamp(0.0, 1.0);
    }

    /// Roll a fresh factor for the cycle that is starting.
    pub fn apply_new_cycle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.previous = self.current;
        self.current = if self.variance == 0.0 {
            1.0
        } else {
            match self.kind {
                VarianceKind::Attenuate => 1.0 - rng.gen_range(0.0..self.variance),
                VarianceKind::Jitter => 1.0 + rng.gen_range(-self.variance..self.variance),
            }
        };
    }

    /// Blended factor at `phase` within the current cycle.
    pub fn factor(&self, phase: f64) -> f64 {
        let weight = if self.ease_in > 0.0 {
            (phase / self.ease_in).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.previous + (self.current - self.previous) * weight
    }
}
