//! Composition Framework registration and validation.

use kinda_lang_core::composition::{CompositeConstruct, CompositeRegistry, Strategy};
use kinda_lang_core::personality::{Mood, Personality};
use kinda_lang_core::Error;
use std::collections::HashMap;

fn all_mood_map(value: f64) -> HashMap<Mood, f64> {
    Mood::all().into_iter().map(|m| (m, value)).collect()
}

#[test]
fn builtin_sorta_is_registered_and_names_its_components() {
    let registry = CompositeRegistry::global();
    let sorta = registry.get("sorta").expect("sorta is a builtin composite");
    assert_eq!(sorta.strategy, Strategy::Union);
    assert_eq!(sorta.components, vec!["sometimes".to_string(), "maybe".to_string()]);
}

#[test]
fn registering_a_composite_with_unknown_dependency_fails_to_resolve() {
    let registry = CompositeRegistry::global();
    let composite = CompositeConstruct::new("depends_on_nothing", Strategy::Union, vec!["totally_unknown".to_string()])
        .with_target_probabilities(all_mood_map(0.5));
    let err = registry.register(composite).unwrap_err();
    assert!(matches!(err, Error::UnresolvedDependency { .. }));
}

#[test]
fn registering_without_all_moods_declared_fails() {
    let registry = CompositeRegistry::global();
    let mut partial = HashMap::new();
    partial.insert(Mood::Reliable, 0.9);
    let composite = CompositeConstruct::new("partial_targets", Strategy::Intersection, vec!["sometimes".to_string()])
        .with_target_probabilities(partial);
    let err = registry.register(composite).unwrap_err();
    assert!(matches!(err, Error::IncompleteTargetProbabilities(_)));
}

#[test]
fn duplicate_composite_name_is_rejected() {
    let registry = CompositeRegistry::global();
    let composite = CompositeConstruct::new("sorta", Strategy::Union, vec!["sometimes".to_string()])
        .with_target_probabilities(all_mood_map(0.5));
    let err = registry.register(composite).unwrap_err();
    assert!(matches!(err, Error::DuplicateComposite(_)));
}

#[test]
fn intersection_composite_matches_declared_target_within_tolerance() {
    let registry = CompositeRegistry::global();
    // Two independent `~probably` gates ANDed together; in reliable mood
    // probably ~ 0.95, so intersection ~ 0.9025. Use a generous tolerance.
    let composite = CompositeConstruct::new(
        "both_probably",
        Strategy::Intersection,
        vec!["probably".to_string(), "probably".to_string()],
    )
    .with_target_probabilities(all_mood_map(0.5))
    .with_tolerance(0.5)
    .with_trials(1000);
    registry.register(composite).expect("loosely-toleranced composite should register");

    let personality = Personality::new(Mood::Reliable, 5, Some(11)).unwrap();
    let trues = (0..500).filter(|_| registry.evaluate(&personality, "both_probably", true).unwrap()).count();
    assert!(trues > 300, "expected intersection of two high-probability gates to mostly hold");
}

#[test]
fn statistical_validation_rejects_impossible_target() {
    let registry = CompositeRegistry::global();
    // `sometimes` alone can never hit a 0.0 target at a 0.01 tolerance.
    let composite = CompositeConstruct::new("impossible", Strategy::Union, vec!["sometimes".to_string()])
        .with_target_probabilities(all_mood_map(0.0))
        .with_tolerance(0.01)
        .with_trials(500);
    let err = registry.register(composite).unwrap_err();
    assert!(matches!(err, Error::StatisticalValidationFailed { .. }));
}
