//! Base probability tables.
//!
//! The table is the contract: values may only be changed with a
//! documented reason (recorded in DESIGN.md), never tuned ad hoc.

use super::Mood;

/// Construct names with a mood-indexed base probability.
///
/// Order: reliable, cautious, playful, chaotic.
const TABLE: &[(&str, [f64; 4])] = &[
    ("sometimes", [0.95, 0.70, 0.50, 0.30]),
    ("maybe", [0.95, 0.75, 0.60, 0.40]),
    ("rarely", [0.30, 0.20, 0.15, 0.10]),
    ("probably", [0.95, 0.85, 0.75, 0.65]),
    ("sorta_print", [0.95, 0.85, 0.80, 0.60]),
    ("ish_true", [0.90, 0.85, 0.80, 0.75]),
];

/// Default base probability used for a construct name that has no entry
/// in [`TABLE`]. Composite constructs built from primitives generally
/// look up the primitives' own entries instead of relying on this.
const DEFAULT_BASE_PROBABILITY: f64 = 0.5;

fn mood_index(mood: Mood) -> usize {
    match mood {
        Mood::Reliable => 0,
        Mood::Cautious => 1,
        Mood::Playful => 2,
        Mood::Chaotic => 3,
    }
}

/// Look up the base probability for `construct_name` under `mood`.
///
/// Falls back to [`DEFAULT_BASE_PROBABILITY`] for constructs that have no
/// tabulated entry (e.g. experimental or user-registered composites that
/// declare their own `target_probabilities` instead).
pub fn base_probability(construct_name: &str, mood: Mood) -> f64 {
    TABLE
        .iter()
        .find(|(name, _)| *name == construct_name)
        .map(|(_, values)| values[mood_index(mood)])
        .unwrap_or(DEFAULT_BASE_PROBABILITY)
}
