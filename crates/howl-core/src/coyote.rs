//! Quantisation and framing for the DG-Lab Coyote (v3) command link.
//!
//! The device consumes one `0xB0` pulse frame per 100ms carrying four 25ms
//! slots per channel, plus an occasional `0xBF` parameter frame. It reports
//! strength changes back with `0xB1` notifications.

use std::ops::RangeInclusive;

use smallvec::SmallVec;

use crate::error::CodecError;
use crate::pulse::Pulse;

/// Seconds covered by one pulse slot.
pub const PULSE_TIME: f64 = 0.025;
/// Pulses carried by each `0xB0` frame.
pub const PULSE_BATCH_SIZE: usize = 4;
/// Bytes in a complete `0xB0` frame.
pub const PULSE_FRAME_LEN: usize = 4 + 4 * PULSE_BATCH_SIZE;

pub const POWER_RANGE: RangeInclusive<u8> = 0..=200;
pub const FREQUENCY_RANGE: RangeInclusive<u32> = 1..=200;
pub const INTERNAL_FREQUENCY_RANGE: RangeInclusive<u8> = 5..=240;
pub const INTENSITY_RANGE: RangeInclusive<u8> = 0..=100;

pub const PULSE_HEADER: u8 = 0xB0;
pub const STATUS_HEADER: u8 = 0xB1;
pub const PARAMETER_HEADER: u8 = 0xBF;
/// Flag byte telling the device to take the strengths in this frame as absolute.
pub const STRENGTH_CHANGED: u8 = 0x1F;

/// Bytes of a pulse frame, stored inline.
pub type PulseFrame = SmallVec<[u8; PULSE_FRAME_LEN]>;

/// Convert a frequency in Hz to the device's nonlinear 5..=240 units.
///
/// The device thinks in pulse periods: 5-100ms map one to one, 100-600ms
/// are compressed by 5 and 600-1000ms by 10. Anything outside falls back
/// to 10.
pub fn frequency_to_device_units(frequency: f64) -> u8 {
    let period = 1000.0 / frequency;
    let calculated = if (5.0..=100.0).contains(&period) {
        period
    } else if period > 100.0 && period <= 600.0 {
        (period - 100.0) / 5.0 + 100.0
    } else if period > 600.0 && period <= 1000.0 {
        (period - 600.0) / 10.0 + 200.0
    } else {
        10.0
    };
    let (min, max) = (
        *INTERNAL_FREQUENCY_RANGE.start(),
        *INTERNAL_FREQUENCY_RANGE.end(),
    );
    calculated.round().clamp(f64::from(min), f64::from(max)) as u8
}

/// Quantise a normalised amplitude to the device's 0..=100 intensity.
#[inline]
pub fn amplitude_to_intensity(amplitude: f32) -> u8 {
    if amplitude.is_nan() {
        return 0;
    }
    (amplitude * 100.0)
        .round()
        .clamp(0.0, f32::from(*INTENSITY_RANGE.end())) as u8
}

/// Stateful builder for `0xB0` pulse frames.
///
/// Fields:
/// - `min_frequency` / `max_frequency`: Hz range that normalised frequency spans
/// - `swap_channels`: send channel A's data on B and vice versa
/// - `last_strength`: strengths most recently framed or reported by the device
#[derive(Clone, Debug, PartialEq)]
pub struct CoyoteEncoder {
    pub min_frequency: f64,
    pub max_frequency: f64,
    pub swap_channels: bool,
    last_strength: (u8, u8),
}

impl Default for CoyoteEncoder {
    fn default() -> Self {
        Self {
            min_frequency: 10.0,
            max_frequency: 100.0,
            swap_channels: false,
            last_strength: (0, 0),
        }
    }
}

impl CoyoteEncoder {
    pub fn new(min_frequency: f64, max_frequency: f64) -> Self {
        Self {
            min_frequency,
            max_frequency,
            ..Self::default()
        }
    }

    pub fn last_strength(&self) -> (u8, u8) {
        self.last_strength
    }

    /// Adopt the strengths reported by the device as the new reference.
    pub fn acknowledge_status(&mut self, report: &StatusReport) {
        self.last_strength = (report.strength_a, report.strength_b);
    }

    /// Assemble a pulse frame for exactly [`PULSE_BATCH_SIZE`] pulses.
    ///
    /// Layout: header, flag, strength A, strength B, then four frequency
    /// bytes and four intensity bytes for A, then the same for B.
    pub fn pulse_frame(
        &mut self,
        strength_a: u8,
        strength_b: u8,
        pulses: &[Pulse],
    ) -> Result<PulseFrame, CodecError> {
        if pulses.len() != PULSE_BATCH_SIZE {
            return Err(CodecError::BatchSize {
                expected: PULSE_BATCH_SIZE,
                actual: pulses.len(),
            });
        }
        let flag = if (strength_a, strength_b) != self.last_strength {
            STRENGTH_CHANGED
        } else {
            0x00
        };
        self.last_strength = (strength_a, strength_b);

        let mut frame = PulseFrame::new();
        frame.extend_from_slice(&[PULSE_HEADER, flag, strength_a, strength_b]);
        let (first, second) = if self.swap_channels {
            (Channel::B, Channel::A)
        } else {
            (Channel::A, Channel::B)
        };
        self.push_channel(&mut frame, pulses, first);
        self.push_channel(&mut frame, pulses, second);
        Ok(frame)
    }

    fn push_channel(&self, frame: &mut PulseFrame, pulses: &[Pulse], channel: Channel) {
        frame.extend(pulses.iter().map(|p| self.frequency_byte(channel.freq(p))));
        frame.extend(pulses.iter().map(|p| amplitude_to_intensity(channel.amp(p))));
    }

    fn frequency_byte(&self, normalised: f32) -> u8 {
        let normalised = if normalised.is_nan() {
            0.0
        } else {
            f64::from(normalised).clamp(0.0, 1.0)
        };
        let hz = self.min_frequency + (self.max_frequency - self.min_frequency) * normalised;
        frequency_to_device_units(hz)
    }
}

#[derive(Clone, Copy)]
enum Channel {
    A,
    B,
}

impl Channel {
    #[inline]
    fn freq(self, pulse: &Pulse) -> f32 {
        match self {
            Channel::A => pulse.freq_a,
            Channel::B => pulse.freq_b,
        }
    }

    #[inline]
    fn amp(self, pulse: &Pulse) -> f32 {
        match self {
            Channel::A => pulse.amp_a,
            Channel::B => pulse.amp_b,
        }
    }
}

/// Per-channel limits and balances carried by the `0xBF` frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceParameters {
    pub channel_a_limit: u8,
    pub channel_b_limit: u8,
    pub channel_a_frequency_balance: u8,
    pub channel_b_frequency_balance: u8,
    pub channel_a_intensity_balance: u8,
    pub channel_b_intensity_balance: u8,
}

impl Default for DeviceParameters {
    fn default() -> Self {
        Self {
            channel_a_limit: 70,
            channel_b_limit: 70,
            channel_a_frequency_balance: 160,
            channel_b_frequency_balance: 160,
            channel_a_intensity_balance: 0,
            channel_b_intensity_balance: 0,
        }
    }
}

impl DeviceParameters {
    pub fn to_frame(&self) -> [u8; 7] {
        [
            PARAMETER_HEADER,
            self.channel_a_limit,
            self.channel_b_limit,
            self.channel_a_frequency_balance,
            self.channel_b_frequency_balance,
            self.channel_a_intensity_balance,
            self.channel_b_intensity_balance,
        ]
    }
}

/// Decoded `0xB1` strength notification.
///
/// `sequence` is zero when the change originated on the device itself
/// (its dial) rather than in answer to a frame we sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusReport {
    pub sequence: u8,
    pub strength_a: u8,
    pub strength_b: u8,
}

impl StatusReport {
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let Some(&header) = bytes.first() else {
            return Err(CodecError::TooShort { needed: 4, actual: 0 });
        };
        if header != STATUS_HEADER {
            return Err(CodecError::BadHeader {
                expected: STATUS_HEADER,
                found: header,
            });
        }
        match bytes {
            [_, sequence, strength_a, strength_b, ..] => Ok(Self {
                sequence: *sequence,
                strength_a: *strength_a,
                strength_b: *strength_b,
            }),
            _ => Err(CodecError::TooShort {
                needed: 4,
                actual: bytes.len(),
            }),
        }
    }

    /// True when the user changed strength on the device.
    pub fn is_local_change(&self) -> bool {
        self.sequence == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_handles_nan_and_overflow() {
        assert_eq!(amplitude_to_intensity(f32::NAN), 0);
        assert_eq!(amplitude_to_intensity(-0.4), 0);
        assert_eq!(amplitude_to_intensity(0.504), 50);
        assert_eq!(amplitude_to_intensity(7.0), 100);
    }

    #[test]
    fn out_of_band_frequency_falls_back() {
        // 250 Hz is a 4ms period, below the one-to-one band
        assert_eq!(frequency_to_device_units(250.0), 10);
        // 0.5 Hz is a 2s period, beyond the widest band
        assert_eq!(frequency_to_device_units(0.5), 10);
    }
}
