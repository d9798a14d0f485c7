//! Time-addressed pulse producers consumed by a playback loop.

use crate::pulse::Pulse;

/// Anything a player can pull pulses from.
///
/// Times are absolute playback positions in seconds. A source that cannot
/// produce a pulse returns [`Pulse::ZERO`] rather than failing.
pub trait PulseSource {
    fn display_name(&self) -> &str;

    /// Length in seconds, when known.
    fn duration(&self) -> Option<f64>;

    fn is_finite(&self) -> bool;

    fn should_loop(&self) -> bool;

    fn ready_to_play(&self) -> bool;

    fn pulse_at_time(&mut self, time: f64) -> Pulse;

    /// Called once per player step after the batch is produced.
    fn update_state(&mut self, time: f64);
}
