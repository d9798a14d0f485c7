/// One tick's stimulus descriptor for both channels.
///
/// All four values are nominally normalised to \[0, 1\]. Producers are not
/// required to clamp; the frame encoder clamps before quantising.
///
/// Fields:
/// - `freq_a` / `freq_b`: position within the configured frequency range
/// - `amp_a` / `amp_b`: fraction of the channel's strength setting
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pulse {
    pub freq_a: f32,
    pub freq_b: f32,
    pub amp_a: f32,
    pub amp_b: f32,
}

impl Pulse {
    /// Silence on both channels.
    pub const ZERO: Pulse = Pulse {
        freq_a: 0.0,
        freq_b: 0.0,
        amp_a: 0.0,
        amp_b: 0.0,
    };

    /// Build a pulse from double-precision simulation values.
    pub fn new(freq_a: f64, freq_b: f64, amp_a: f64, amp_b: f64) -> Self {
        Self {
            freq_a: freq_a as f32,
            freq_b: freq_b as f32,
            amp_a: amp_a as f32,
            amp_b: amp_b as f32,
        }
    }
}
