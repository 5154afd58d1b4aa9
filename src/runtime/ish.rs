//! `~ish` comparison and value fuzzing.
//!
//! Tolerance is resolved as **relative** to `|a|`, the explicit resolution
//! recorded for this implementation in DESIGN.md.

use crate::personality::Personality;
use crate::runtime::numeric::kinda_float;

const DEFAULT_TOLERANCE: f64 = 0.1;

/// `a ~ish b` in a boolean context. Fuzzes both operands, checks
/// closeness within a tolerance relative to `|a|`, then post-filters the
/// boolean result through `probability("ish_true")`.
pub fn ish_comparison(personality: &Personality, a: f64, b: f64, tolerance: Option<f64>) -> bool {
    let tolerance = tolerance.unwrap_or(DEFAULT_TOLERANCE);
    let fuzzed_a = kinda_float(personality, a);
    let fuzzed_b = kinda_float(personality, b);
    let allowed = kinda_float(personality, a.abs() * tolerance);
    let within_tolerance = (fuzzed_a - fuzzed_b).abs() <= allowed;

    let ish_true_probability = personality.probability("ish_true");
    let roll = personality.random();
    personality.update_chaos_state(false);
    if within_tolerance {
        roll < ish_true_probability
    } else {
        roll >= ish_true_probability
    }
}

/// `= ~ish b` in an assignment context. Returns a fuzzed value within a
/// relative tolerance of `v`, without the boolean post-filter.
pub fn ish_value(personality: &Personality, v: f64, tolerance: Option<f64>) -> f64 {
    let tolerance = tolerance.unwrap_or(DEFAULT_TOLERANCE);
    let sign = if personality.random() < 0.5 { -1.0 } else { 1.0 };
    let epsilon = personality.random();
    let fuzzed = kinda_float(personality, v);
    personality.update_chaos_state(false);
    fuzzed * (1.0 + sign * tolerance * epsilon)
}
