//! Randomised-range helpers used by every self-scheduling activity.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::error::{Result, SynthError};

/// Uniform draw from `range`. A zero-width range returns its start.
#[inline]
pub fn random_in_range<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<f64>) -> f64 {
    let (min, max) = range.into_inner();
    if min == max {
        return min;
    }
    min + rng.gen::<f64>() * (max - min)
}

/// Power-biased draw from `range`.
///
/// A uniform sample `u` in \[0, 1) is raised to `bias` before being mapped
/// into the range: `bias > 1` leans toward the start, `bias < 1` toward the
/// end, and `bias == 1` is uniform.
pub fn random_in_range_biased<R: Rng + ?Sized>(
    rng: &mut R,
    range: RangeInclusive<f64>,
    bias: f64,
) -> Result<f64> {
    if bias <= 0.0 || bias.is_nan() {
        return Err(SynthError::InvalidBias(bias));
    }
    let (min, max) = range.into_inner();
    if min == max {
        return Ok(min);
    }
    let u = rng.gen::<f64>().powf(bias);
    Ok(min + u * (max - min))
}

/// Uniform integer draw from an inclusive range.
#[inline]
pub fn random_int_in_range<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<u32>) -> u32 {
    if range.start() >= range.end() {
        return *range.start();
    }
    rng.gen_range(range)
}

/// Bernoulli trial with success probability `p`.
#[inline]
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.gen::<f64>() < p
}

/// Mix a base seed with a stream index so sibling components draw
/// independent sequences.
#[inline]
pub fn derive_seed(seed: u64, stream: u64) -> u64 {
    seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
