//! Externally authored position tracks.
//!
//! A track is a table of `(seconds, position)` points. Position is
//! interpolated with a Hermite curve whose tangents are estimated from the
//! neighbouring secants, and the pulse is derived from position and speed.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::error::{Result, SynthError};
use crate::math::{feel_adjustment, hermite_with_velocity, positional_effect, scale_velocity};
use crate::pulse::Pulse;
use crate::source::PulseSource;

/// User-facing knobs for deriving pulses from a track.
///
/// Fields:
/// - `volume`: 0..=1, higher makes slow movement louder
/// - `positional_effect_strength`: how far position pans between channels
/// - `frequency_time_offset`: seconds channel A's frequency lags channel B's
/// - `feel_exponent`: curve applied to the position before it becomes frequency
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackSettings {
    pub volume: f64,
    pub positional_effect_strength: f64,
    pub frequency_time_offset: f64,
    pub feel_exponent: f64,
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            volume: 0.5,
            positional_effect_strength: 1.0,
            frequency_time_offset: 0.1,
            feel_exponent: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TrackPoint {
    position: f64,
    velocity: f64,
}

/// Ordered keys for the point map. Construction rejects non-finite times.
#[derive(Clone, Copy, Debug)]
struct Seconds(f64);

impl PartialEq for Seconds {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Seconds {}

impl PartialOrd for Seconds {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Seconds {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A finite, non-looping pulse source built from a position table.
#[derive(Clone, Debug)]
pub struct ControlTrack {
    name: String,
    points: BTreeMap<Seconds, TrackPoint>,
    settings: TrackSettings,
}

impl ControlTrack {
    /// Build from `(seconds, position)` points in any order.
    ///
    /// Positions are clamped to \[0, 1\]. Duplicate times keep the last point.
    pub fn new(name: impl Into<String>, points: &[(f64, f64)]) -> Result<Self> {
        let name = name.into();
        if points.is_empty() {
            return Err(SynthError::InvalidTrack(format!("`{name}` has no points")));
        }
        let mut ordered = BTreeMap::new();
        for (index, &(time, position)) in points.iter().enumerate() {
            if !time.is_finite() || !position.is_finite() {
                return Err(SynthError::InvalidTrack(format!(
                    "`{name}` point {index} is not a finite number"
                )));
            }
            // folds -0.0 into 0.0
            ordered.insert(Seconds(time + 0.0), position.clamp(0.0, 1.0));
        }
        let scaled: Vec<(f64, f64)> = ordered.into_iter().map(|(t, p)| (t.0, p)).collect();

        let last = scaled.len() - 1;
        let points = scaled
            .iter()
            .enumerate()
            .map(|(i, &(time, position))| {
                let velocity = if i == 0 || i == last {
                    0.0
                } else {
                    let (t0, p0) = scaled[i - 1];
                    let (t1, p1) = scaled[i + 1];
                    let before = (position - p0) / (time - t0);
                    let after = (p1 - position) / (t1 - time);
                    (before + after) * 0.5
                };
                (Seconds(time), TrackPoint { position, velocity })
            })
            .collect();

        Ok(Self {
            name,
            points,
            settings: TrackSettings::default(),
        })
    }

    /// Parse a two-column text table of seconds and position.
    ///
    /// Columns may be separated by whitespace or a comma. Blank lines and
    /// lines starting with `#` are skipped.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self> {
        let name = name.into();
        let mut points = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut columns = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty());
            let parsed = match (columns.next(), columns.next(), columns.next()) {
                (Some(time), Some(position), None) => {
                    time.parse::<f64>().ok().zip(position.parse::<f64>().ok())
                }
                _ => None,
            };
            match parsed {
                Some(point) => points.push(point),
                None => {
                    return Err(SynthError::InvalidTrack(format!(
                        "`{name}` line {}: expected `seconds position`, got `{line}`",
                        line_no + 1
                    )))
                }
            }
        }
        Self::new(name, &points)
    }

    pub fn settings(&self) -> TrackSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: TrackSettings) {
        self.settings = settings;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Interpolated `(position, velocity)` at `time`.
    ///
    /// Before the first point and after the last the track holds its end
    /// position with zero velocity.
    pub fn position_and_velocity(&self, time: f64) -> (f64, f64) {
        let before = self.points.range(..=Seconds(time)).next_back();
        let after = self
            .points
            .range((Bound::Excluded(Seconds(time)), Bound::Unbounded))
            .next();
        match (before, after) {
            (None, None) => (0.0, 0.0),
            (None, Some((_, p))) | (Some((_, p)), None) => (p.position, 0.0),
            (Some((t0, p0)), Some((t1, p1))) => {
                if p0.position == p1.position {
                    return (p0.position, 0.0);
                }
                let (position, velocity) = hermite_with_velocity(
                    time, t0.0, p0.position, p0.velocity, t1.0, p1.position, p1.velocity,
                );
                (position.clamp(0.0, 1.0), velocity)
            }
        }
    }
}

impl PulseSource for ControlTrack {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn duration(&self) -> Option<f64> {
        self.points.keys().next_back().map(|t| t.0)
    }

    fn is_finite(&self) -> bool {
        true
    }

    fn should_loop(&self) -> bool {
        false
    }

    fn ready_to_play(&self) -> bool {
        !self.points.is_empty()
    }

    fn pulse_at_time(&mut self, time: f64) -> Pulse {
        let s = self.settings;
        let (position, velocity) = self.position_and_velocity(time);
        let (offset_position, _) = self.position_and_velocity(time - s.frequency_time_offset);

        let amplitude = scale_velocity(velocity, 1.0 - s.volume);
        let (amp_a, amp_b) = positional_effect(amplitude, position, s.positional_effect_strength);
        Pulse::new(
            feel_adjustment(offset_position, s.feel_exponent),
            feel_adjustment(position, s.feel_exponent),
            amp_a,
            amp_b,
        )
    }

    fn update_state(&mut self, _time: f64) {}
}
