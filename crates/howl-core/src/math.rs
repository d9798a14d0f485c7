//! Interpolation and signal-shaping helpers shared by waves and activities.

use crate::error::{Result, SynthError};

/// Smoothstep easing `t^2 (3 - 2t)` with `t` clamped to \[0, 1\].
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Straight-line interpolation between `(t0, p0)` and `(t1, p1)`.
///
/// Returns `(position, velocity)`. A degenerate interval yields `(p0, 0)`.
pub fn linear_with_velocity(t: f64, t0: f64, p0: f64, t1: f64, p1: f64) -> (f64, f64) {
    if t0 >= t1 {
        return (p0, 0.0);
    }
    let h = (t - t0) / (t1 - t0);
    (p0 + h * (p1 - p0), (p1 - p0) / (t1 - t0))
}

/// Cubic Hermite interpolation between two points carrying slopes.
///
/// Returns `(position, velocity)` where velocity is the analytic derivative
/// with respect to `t`. A degenerate interval yields `(p0, 0)`.
pub fn hermite_with_velocity(
    t: f64,
    t0: f64,
    p0: f64,
    m0: f64,
    t1: f64,
    p1: f64,
    m1: f64,
) -> (f64, f64) {
    if t0 >= t1 {
        return (p0, 0.0);
    }
    let span = t1 - t0;
    let h = (t - t0) / span;
    let h2 = h * h;
    let h3 = h2 * h;

    let position = p0 * (2.0 * h3 - 3.0 * h2 + 1.0)
        + m0 * (h3 - 2.0 * h2 + h) * span
        + p1 * (-2.0 * h3 + 3.0 * h2)
        + m1 * (h3 - h2) * span;

    let dp_dh = (6.0 * h2 - 6.0 * h) * p0
        + (3.0 * h2 - 4.0 * h + 1.0) * m0 * span
        + (-6.0 * h2 + 6.0 * h) * p1
        + (3.0 * h2 - 2.0 * h) * m1 * span;

    (position, dp_dh / span)
}

/// Remap `x` from \[0, 1\] onto `a..b`, clamped to the output interval.
#[inline]
pub fn scale_between(x: f64, a: f64, b: f64) -> f64 {
    (a + (b - a) * x).clamp(a.min(b), a.max(b))
}

/// Compress an unbounded velocity into \[0, 1).
///
/// Lower `sensitivity` saturates sooner. Zero velocity maps to zero.
#[inline]
pub fn scale_velocity(velocity: f64, sensitivity: f64) -> f64 {
    if velocity == 0.0 {
        return 0.0;
    }
    let speed = velocity.abs();
    speed / (speed + sensitivity)
}

/// Equal-power pan of `amplitude` across both channels driven by `position`.
///
/// `strength` blends between a centred split (0) and the full pan (1).
/// Returns `(amp_a, amp_b)`.
pub fn positional_effect(amplitude: f64, position: f64, strength: f64) -> (f64, f64) {
    let effective = 0.5 * (1.0 - strength) + position * strength;
    (
        amplitude * (1.0 - effective).max(0.0).sqrt(),
        amplitude * effective.max(0.0).sqrt(),
    )
}

const ENGULF_FALLOFF: f64 = 0.8;

/// Coverage-style amplitude law with an independent threshold per channel.
///
/// Below its point a channel ramps in as `sqrt(position / point)`; past it
/// the channel fades as `sqrt(1 - 0.8 * |position - point|)`.
/// Returns `(amp_a, amp_b)`.
pub fn engulf_effect(amplitude: f64, position: f64, point_a: f64, point_b: f64) -> (f64, f64) {
    (
        amplitude * engulf_factor(position, point_a),
        amplitude * engulf_factor(position, point_b),
    )
}

#[inline]
fn engulf_factor(position: f64, point: f64) -> f64 {
    if position <= point {
        if point == 0.0 {
            1.0
        } else {
            (position / point).max(0.0).sqrt()
        }
    } else {
        (1.0 - ENGULF_FALLOFF * (position - point).abs()).max(0.0).sqrt()
    }
}

/// Bend a normalised frequency by `exponent`, clamped to \[0, 1\].
#[inline]
pub fn feel_adjustment(frequency: f64, exponent: f64) -> f64 {
    frequency.max(0.0).powf(exponent).clamp(0.0, 1.0)
}

/// How a [`FrequencyConverter`] blends between neighbouring points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrequencyCurve {
    Smoothstep,
    Linear,
}

/// Piecewise mapping from a position to a normalised frequency.
///
/// Positions outside the covered domain take the nearest end value.
#[derive(Clone, Debug)]
pub struct FrequencyConverter {
    points: Vec<(f64, f64)>,
    curve: FrequencyCurve,
}

impl FrequencyConverter {
    /// Build a converter from `(position, frequency)` pairs in any order.
    pub fn new(points: &[(f64, f64)], curve: FrequencyCurve) -> Result<Self> {
        if points.is_empty() {
            return Err(SynthError::EmptyConverter);
        }
        let mut points = points.to_vec();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { points, curve })
    }

    pub fn frequency(&self, position: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return 0.0,
        };
        if self.points.len() == 1 || position <= first.0 {
            return first.1;
        }
        if position >= last.0 {
            return last.1;
        }
        self.points
            .windows(2)
            .find(|pair| position >= pair[0].0 && position <= pair[1].0)
            .map(|pair| self.blend(pair[0], pair[1], position))
            .unwrap_or(last.1)
    }

    fn blend(&self, lower: (f64, f64), upper: (f64, f64), position: f64) -> f64 {
        match self.curve {
            FrequencyCurve::Linear => {
                linear_with_velocity(position, lower.0, lower.1, upper.0, upper.1).0
            }
            FrequencyCurve::Smoothstep => {
                let h = (position - lower.0) / (upper.0 - lower.0);
                lower.1 + smoothstep(h) * (upper.1 - lower.1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hermite_hits_both_endpoints() {
        let (p0, _) = hermite_with_velocity(0.2, 0.2, 0.3, 1.0, 0.6, 0.9, -1.0);
        let (p1, _) = hermite_with_velocity(0.6, 0.2, 0.3, 1.0, 0.6, 0.9, -1.0);
        assert!((p0 - 0.3).abs() < 1e-12);
        assert!((p1 - 0.9).abs() < 1e-12);
    }

    #[test]
    fn hermite_velocity_matches_slopes_at_endpoints() {
        let (_, v0) = hermite_with_velocity(0.0, 0.0, 0.0, 0.7, 0.5, 1.0, -0.3);
        let (_, v1) = hermite_with_velocity(0.5, 0.0, 0.0, 0.7, 0.5, 1.0, -0.3);
        assert!((v0 - 0.7).abs() < 1e-9, "start slope {v0}");
        assert!((v1 + 0.3).abs() < 1e-9, "end slope {v1}");
    }

    #[test]
    fn degenerate_intervals_hold_first_value() {
        assert_eq!(hermite_with_velocity(0.5, 0.5, 0.4, 1.0, 0.5, 0.9, 1.0), (0.4, 0.0));
        assert_eq!(linear_with_velocity(0.5, 0.7, 0.4, 0.2, 0.9), (0.4, 0.0));
    }

    #[test]
    fn engulf_point_at_zero_is_fully_covered() {
        assert_eq!(engulf_factor(0.0, 0.0), 1.0);
        assert!((engulf_factor(0.5, 0.0) - (1.0f64 - 0.4).sqrt()).abs() < 1e-12);
    }
}
