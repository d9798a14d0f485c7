//! Keyframe wave shapes sampled cyclically over simulation time.

use std::sync::Arc;

use crate::error::{Result, SynthError};
use crate::math::{hermite_with_velocity, linear_with_velocity};

/// Keyframe inside one cycle.
///
/// Fields:
/// - `time`: phase within the cycle, in \[0, 1)
/// - `position`: value at that phase
/// - `slope`: tangent used by Hermite interpolation (ignored by linear)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WavePoint {
    pub time: f64,
    pub position: f64,
    pub slope: f64,
}

impl WavePoint {
    pub const fn new(time: f64, position: f64, slope: f64) -> Self {
        Self {
            time,
            position,
            slope,
        }
    }

    fn shifted(self, cycles: f64) -> Self {
        Self {
            time: self.time + cycles,
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Hermite,
    Linear,
}

/// Validated, immutable description of one wave cycle.
///
/// The last point connects to a copy of the first point shifted one cycle
/// forward, so every shape loops seamlessly.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveShape {
    name: String,
    points: Arc<[WavePoint]>,
    interpolation: Interpolation,
}

impl WaveShape {
    /// Build a shape, rejecting fewer than two points, times outside
    /// \[0, 1), or times that do not strictly increase.
    pub fn new(
        name: impl Into<String>,
        points: &[WavePoint],
        interpolation: Interpolation,
    ) -> Result<Self> {
        let name = name.into();
        if points.len() < 2 {
            return Err(SynthError::TooFewPoints {
                name,
                count: points.len(),
            });
        }
        for (index, point) in points.iter().enumerate() {
            if !(0.0..1.0).contains(&point.time) {
                return Err(SynthError::PointOutOfRange {
                    name,
                    index,
                    time: point.time,
                });
            }
            if index > 0 && point.time <= points[index - 1].time {
                return Err(SynthError::NonIncreasingTime { name, index });
            }
        }
        Ok(Self {
            name,
            points: points.into(),
            interpolation,
        })
    }

    /// Convenience constructor from `(time, position, slope)` triples.
    pub fn from_triples(
        name: impl Into<String>,
        triples: &[(f64, f64, f64)],
        interpolation: Interpolation,
    ) -> Result<Self> {
        let points: Vec<WavePoint> = triples
            .iter()
            .map(|&(t, p, s)| WavePoint::new(t, p, s))
            .collect();
        Self::new(name, &points, interpolation)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[WavePoint] {
        &self.points
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    fn bracket(&self, phase: f64) -> (WavePoint, WavePoint) {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if phase < first.time {
            return (last.shifted(-1.0), first);
        }
        if phase >= last.time {
            return (last, first.shifted(1.0));
        }
        self.points
            .windows(2)
            .find(|pair| phase >= pair[0].time && phase < pair[1].time)
            .map(|pair| (pair[0], pair[1]))
            .unwrap_or((last, first.shifted(1.0)))
    }
}

/// Stateless sampler that repeats a [`WaveShape`] once per unit of time.
#[derive(Clone, Debug, PartialEq)]
pub struct CyclicalWave {
    shape: WaveShape,
}

impl CyclicalWave {
    pub fn new(shape: WaveShape) -> Self {
        Self { shape }
    }

    pub fn shape(&self) -> &WaveShape {
        &self.shape
    }

    pub fn name(&self) -> &str {
        self.shape.name()
    }

    /// Position and velocity at `sim_time`; only the fractional part matters.
    pub fn position_and_velocity(&self, sim_time: f64) -> (f64, f64) {
        let phase = sim_time.rem_euclid(1.0);
        let (p0, p1) = self.shape.bracket(phase);
        match self.shape.interpolation {
            Interpolation::Hermite => hermite_with_velocity(
                phase,
                p0.time,
                p0.position,
                p0.slope,
                p1.time,
                p1.position,
                p1.slope,
            ),
            Interpolation::Linear => {
                linear_with_velocity(phase, p0.time, p0.position, p1.time, p1.position)
            }
        }
    }

    pub fn position(&self, sim_time: f64) -> f64 {
        self.position_and_velocity(sim_time).0
    }
}

impl From<WaveShape> for CyclicalWave {
    fn from(shape: WaveShape) -> Self {
        Self::new(shape)
    }
}
