//! Error type shared by the waveform toolkit and the activities built on it.

use thiserror::Error;

/// Failures raised by the synthesis toolkit.
///
/// Every variant is a caller error: the toolkit never produces one on its own
/// while being driven correctly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    #[error("time delta must be non-negative, got {0}")]
    NegativeDelta(f64),

    #[error("wave shape `{name}` needs at least two points, got {count}")]
    TooFewPoints { name: String, count: usize },

    #[error("wave shape `{name}` point {index} has time {time} outside [0, 1)")]
    PointOutOfRange { name: String, index: usize, time: f64 },

    #[error("wave shape `{name}` point {index} does not come after the previous point")]
    NonIncreasingTime { name: String, index: usize },

    #[error("wave `{0}` not found")]
    WaveNotFound(String),

    #[error("random bias must be greater than zero, got {0}")]
    InvalidBias(f64),

    #[error("frequency converter needs at least one point")]
    EmptyConverter,

    #[error("control track {0}")]
    InvalidTrack(String),
}

pub type Result<T> = std::result::Result<T, SynthError>;

/// Failures while building or decoding Coyote command frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("pulse batch must hold exactly {expected} pulses, got {actual}")]
    BatchSize { expected: usize, actual: usize },

    #[error("unexpected frame header {found:#04X}, expected {expected:#04X}")]
    BadHeader { expected: u8, found: u8 },

    #[error("frame too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}
