//! Noisy numeric coercions: `kinda_int`, `kinda_float`, `kinda_bool`.

use crate::personality::{Mood, Personality};
use std::f64::consts::PI;

/// Per-mood weights for the δ ∈ {-1, 0, +1} offset in [`kinda_int`].
fn delta_weights(mood: Mood) -> [f64; 3] {
    match mood {
        Mood::Reliable => [0.05, 0.90, 0.05],
        Mood::Cautious => [0.10, 0.75, 0.15],
        Mood::Playful => [0.20, 0.55, 0.25],
        Mood::Chaotic => [0.34, 0.32, 0.34],
    }
}

/// Per-mood standard deviation for the multiplicative noise in
/// [`kinda_float`], truncated to `±3σ`.
fn sigma_for_mood(mood: Mood) -> f64 {
    match mood {
        Mood::Reliable => 0.01,
        Mood::Cautious => 0.05,
        Mood::Playful => 0.09,
        Mood::Chaotic => 0.15,
    }
}

/// Per-mood relative spread `k` used by `kinda_repeat_count`.
pub(crate) fn repeat_spread_for_mood(mood: Mood) -> f64 {
    match mood {
        Mood::Reliable => 0.0,
        Mood::Cautious => 0.1,
        Mood::Playful => 0.2,
        Mood::Chaotic => 0.3,
    }
}

fn weighted_delta(personality: &Personality, mood: Mood) -> i64 {
    let weights = delta_weights(mood);
    let roll = personality.random();
    if roll < weights[0] {
        -1
    } else if roll < weights[0] + weights[1] {
        0
    } else {
        1
    }
}

/// `~kinda int` coercion. Returns `round(value) + δ`.
///
/// `value` must be finite; NaN/infinite input is treated as the Rust
/// analogue of "not numeric-coercible": it is reported as a failure and
/// `0` is returned rather than propagating a non-finite result.
pub fn kinda_int(personality: &Personality, value: f64) -> i64 {
    if !value.is_finite() {
        personality.update_chaos_state(true);
        return 0;
    }
    let delta = weighted_delta(personality, personality.mood());
    personality.update_chaos_state(false);
    value.round() as i64 + delta
}

/// `~kinda float` coercion. Returns `value * (1 + ε)`, `ε ~ Normal(0, σ)`
/// truncated to `±3σ` by bounded rejection sampling.
pub fn kinda_float(personality: &Personality, value: f64) -> f64 {
    if !value.is_finite() {
        personality.update_chaos_state(true);
        return value;
    }
    let sigma = sigma_for_mood(personality.mood());
    let mut epsilon = 0.0;
    for _ in 0..8 {
        epsilon = standard_normal(personality) * sigma;
        if epsilon.abs() <= 3.0 * sigma {
            break;
        }
    }
    let epsilon = epsilon.clamp(-3.0 * sigma, 3.0 * sigma);
    personality.update_chaos_state(false);
    value * (1.0 + epsilon)
}

/// Standard normal sample via the Box-Muller transform, using only
/// [`Personality::random`] draws, the sole permitted randomness source.
fn standard_normal(personality: &Personality) -> f64 {
    let u1 = personality.random().max(f64::MIN_POSITIVE);
    let u2 = personality.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Per-mood independent flip probability for [`kinda_bool`].
fn flip_probability(mood: Mood) -> f64 {
    match mood {
        Mood::Reliable => 0.02,
        Mood::Cautious => 0.06,
        Mood::Playful => 0.10,
        Mood::Chaotic => 0.15,
    }
}

/// `~kinda bool` coercion. Returns `value` with an independent chance of
/// being flipped, scaled per mood.
pub fn kinda_bool(personality: &Personality, value: bool) -> bool {
    let flipped = personality.random() < flip_probability(personality.mood());
    personality.update_chaos_state(false);
    if flipped {
        !value
    } else {
        value
    }
}
