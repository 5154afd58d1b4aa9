//! Composition Framework: composite constructs built out of
//! already-registered primitives (or other composites) under a declared
//! combination strategy, validated statistically before they are accepted.

mod strategy;

pub use strategy::Strategy;

use crate::error::{Error, Result};
use crate::personality::{Mood, Personality};
use crate::runtime;
use crate::validation::{detect_cycles, monte_carlo, validate_dependencies, DependencyResolver};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

const DEFAULT_TRIALS: u32 = 2000;
const DEFAULT_TOLERANCE: f64 = 0.1;

/// Whether a composite's evaluation result may be memoized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    None,
    /// Only cache when the active personality's mood is `reliable`, the
    /// one mood where repeated evaluation is meant to be stable.
    DeterministicOnly,
}

/// A registered composite construct.
#[derive(Clone)]
pub struct CompositeConstruct {
    pub name: String,
    pub strategy: Strategy,
    pub components: Vec<String>,
    /// Signed probability correction applied per mood, on top of the
    /// strategy's raw combination of component outcomes. A positive bridge
    /// can flip a false combination to true; a negative bridge can flip a
    /// true combination to false. Zero (the default for an unlisted mood)
    /// leaves the raw combination untouched.
    pub personality_bridges: HashMap<Mood, f64>,
    /// Expected P(true) per mood; used to statistically validate
    /// registration and not otherwise consulted at evaluation time.
    pub target_probabilities: HashMap<Mood, f64>,
    pub cache_policy: CachePolicy,
    /// Tolerance the Monte-Carlo validator allows between `observed` and
    /// `target_probabilities[mood]` at registration time.
    pub tolerance: f64,
    /// Number of Monte-Carlo trials run per mood at registration time.
    pub trials: u32,
    /// Relative closeness tolerance for `Strategy::Tolerance` composites,
    /// forwarded to `runtime::ish_comparison`. Unused by every other
    /// strategy.
    pub close_tolerance: Option<f64>,
}

impl CompositeConstruct {
    /// Builder with documented defaults (`tolerance = 0.1`, `trials = 2000`,
    /// no bridges, no cache, no close tolerance override).
    pub fn new(name: impl Into<String>, strategy: Strategy, components: Vec<String>) -> Self {
        Self {
            name: name.into(),
            strategy,
            components,
            personality_bridges: HashMap::new(),
            target_probabilities: HashMap::new(),
            cache_policy: CachePolicy::None,
            tolerance: DEFAULT_TOLERANCE,
            trials: DEFAULT_TRIALS,
            close_tolerance: None,
        }
    }

    pub fn with_target_probabilities(mut self, targets: HashMap<Mood, f64>) -> Self {
        self.target_probabilities = targets;
        self
    }

    pub fn with_bridges(mut self, bridges: HashMap<Mood, f64>) -> Self {
        self.personality_bridges = bridges;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn with_close_tolerance(mut self, tolerance: f64) -> Self {
        self.close_tolerance = Some(tolerance);
        self
    }

    fn bridge_for(&self, mood: Mood) -> f64 {
        self.personality_bridges.get(&mood).copied().unwrap_or(0.0)
    }
}

struct CacheKey {
    composite: String,
    args_fingerprint: u64,
}

/// Registry of composite constructs, separate from [`crate::registry::Registry`]
/// because composites are registered dynamically (and validated
/// statistically) rather than being a fixed built-in catalog.
pub struct CompositeRegistry {
    entries: Mutex<IndexMap<String, CompositeConstruct>>,
    cache: Mutex<HashMap<(String, u64), bool>>,
}

impl CompositeRegistry {
    fn empty() -> Self {
        Self { entries: Mutex::new(IndexMap::new()), cache: Mutex::new(HashMap::new()) }
    }

    /// The process-wide composite registry, seeded with the built-in
    /// `~sorta` composite on first access. If the built-in registration
    /// somehow fails its own statistical check, that failure is logged and
    /// the registry is still returned, empty of `sorta`, rather than taking
    /// the whole process down.
    pub fn global() -> &'static CompositeRegistry {
        static REGISTRY: OnceLock<CompositeRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let registry = CompositeRegistry::empty();
            if let Err(err) = registry.register(builtin_sorta()) {
                tracing::error!(error = %err, "built-in sorta composite failed registration");
            }
            registry
        })
    }

    /// Registers `composite`, running dependency resolution, cycle
    /// detection, target-probability completeness, and Monte-Carlo
    /// statistical validation in that order. The first failure aborts
    /// registration; nothing is left partially registered.
    pub fn register(&self, composite: CompositeConstruct) -> Result<()> {
        {
            let entries = self.entries.lock().expect("composite registry mutex poisoned");
            if entries.contains_key(&composite.name) {
                return Err(Error::DuplicateComposite(composite.name.clone()));
            }
        }

        if let Some(missing) = validate_dependencies(self, &composite.components) {
            return Err(Error::UnresolvedDependency {
                composite: composite.name.clone(),
                dependency: missing,
            });
        }
        if let Some(cycle) = detect_cycles(self, &composite.name, &composite.components) {
            return Err(Error::DependencyCycle(cycle.join(" -> ")));
        }
        for mood in Mood::all() {
            if !composite.target_probabilities.contains_key(&mood) {
                return Err(Error::IncompleteTargetProbabilities(composite.name.clone()));
            }
        }

        for mood in Mood::all() {
            let personality = Personality::new(mood, 5, Some(0xC0FFEE)).map_err(|_| {
                Error::StatisticalValidationFailed {
                    composite: composite.name.clone(),
                    mood: mood.name().to_string(),
                    observed: 0.0,
                    target: composite.target_probabilities[&mood],
                    tolerance: composite.tolerance,
                }
            })?;
            let target = composite.target_probabilities[&mood];
            let result = monte_carlo(|| sample_for_registration(&personality, &composite), composite.trials);
            if (result.observed - target).abs() > composite.tolerance {
                return Err(Error::StatisticalValidationFailed {
                    composite: composite.name.clone(),
                    mood: mood.name().to_string(),
                    observed: result.observed,
                    target,
                    tolerance: composite.tolerance,
                });
            }
        }

        let mut entries = self.entries.lock().expect("composite registry mutex poisoned");
        entries.insert(composite.name.clone(), composite);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<CompositeConstruct> {
        self.entries.lock().expect("composite registry mutex poisoned").get(name).cloned()
    }

    /// Evaluates the named boolean composite against `cond`, honoring its
    /// cache policy when `personality.mood()` is `reliable`. Returns
    /// `Err(WrongEvaluationEntryPoint)` for a `Strategy::Tolerance`
    /// composite, which has no `cond` of its own and must go through
    /// [`CompositeRegistry::evaluate_tolerance`] instead.
    pub fn evaluate(&self, personality: &Personality, name: &str, cond: bool) -> Result<bool> {
        let composite = self
            .get(name)
            .ok_or_else(|| Error::UnresolvedDependency { composite: name.to_string(), dependency: name.to_string() })?;

        if composite.strategy == Strategy::Tolerance {
            return Err(Error::WrongEvaluationEntryPoint {
                composite: name.to_string(),
                expected: "evaluate_tolerance",
            });
        }

        if composite.cache_policy == CachePolicy::DeterministicOnly && personality.mood() == Mood::Reliable {
            let key = cache_key(name, cond);
            if let Some(&cached) = self.cache.lock().expect("composite cache mutex poisoned").get(&key) {
                return Ok(cached);
            }
            let result = evaluate_strategy(personality, &composite, cond);
            self.cache.lock().expect("composite cache mutex poisoned").insert(key, result);
            return Ok(result);
        }

        Ok(evaluate_strategy(personality, &composite, cond))
    }

    /// Evaluates the named `Strategy::Tolerance` composite against the two
    /// numeric operands `a` and `b`. Returns `Err(WrongEvaluationEntryPoint)`
    /// for any other strategy, which has no numeric operands and must go
    /// through [`CompositeRegistry::evaluate`] instead.
    pub fn evaluate_tolerance(&self, personality: &Personality, name: &str, a: f64, b: f64) -> Result<bool> {
        let composite = self
            .get(name)
            .ok_or_else(|| Error::UnresolvedDependency { composite: name.to_string(), dependency: name.to_string() })?;

        if composite.strategy != Strategy::Tolerance {
            return Err(Error::WrongEvaluationEntryPoint { composite: name.to_string(), expected: "evaluate" });
        }

        Ok(evaluate_tolerance_trial(personality, &composite, a, b))
    }
}

fn cache_key(name: &str, cond: bool) -> (String, u64) {
    (name.to_string(), u64::from(cond))
}

impl DependencyResolver for CompositeRegistry {
    fn is_registered(&self, name: &str) -> bool {
        crate::registry::Registry::global().contains(name)
            || self.entries.lock().expect("composite registry mutex poisoned").contains_key(name)
    }

    fn dependencies_of(&self, name: &str) -> Vec<String> {
        self.entries
            .lock()
            .expect("composite registry mutex poisoned")
            .get(name)
            .map(|c| c.components.clone())
            .unwrap_or_default()
    }
}

/// Evaluates a single named component: a registered primitive boolean
/// construct, or (recursively) another composite.
fn evaluate_component(personality: &Personality, name: &str, cond: bool) -> bool {
    match name {
        "sometimes" => runtime::sometimes(personality, cond),
        "maybe" => runtime::maybe(personality, cond),
        "rarely" => runtime::rarely(personality, cond),
        "probably" => runtime::probably(personality, cond),
        other => CompositeRegistry::global()
            .evaluate(personality, other, cond)
            .unwrap_or(false),
    }
}

/// Applies a signed bridge correction on top of a strategy's raw combined
/// result. A positive bridge can only turn a `false` into a `true`; a
/// negative bridge can only turn a `true` into a `false`. Magnitude is the
/// probability of that flip happening on a given evaluation.
fn apply_bridge(personality: &Personality, combined: bool, bridge: f64) -> bool {
    if bridge > 0.0 {
        combined || personality.random() < bridge
    } else if bridge < 0.0 {
        combined && personality.random() >= bridge.abs()
    } else {
        combined
    }
}

fn evaluate_strategy(personality: &Personality, composite: &CompositeConstruct, cond: bool) -> bool {
    let combined = match &composite.strategy {
        // Lazily evaluates components in order and stops at the first
        // success; later components are never rolled.
        Strategy::Sequential => composite.components.iter().any(|name| evaluate_component(personality, name, cond)),
        Strategy::Tolerance => {
            unreachable!("Tolerance composites are evaluated through CompositeRegistry::evaluate_tolerance")
        }
        _ => {
            let outcomes: Vec<bool> =
                composite.components.iter().map(|name| evaluate_component(personality, name, cond)).collect();
            match &composite.strategy {
                Strategy::Union => outcomes.iter().any(|o| *o),
                Strategy::Intersection => !outcomes.is_empty() && outcomes.iter().all(|o| *o),
                Strategy::Threshold(k) => outcomes.iter().filter(|o| **o).count() >= *k,
                Strategy::Weighted(weights) => {
                    let total: f64 = weights.iter().sum();
                    if total <= 0.0 {
                        false
                    } else {
                        let score: f64 = outcomes
                            .iter()
                            .zip(weights.iter())
                            .map(|(o, w)| if *o { *w } else { 0.0 })
                            .sum();
                        score / total >= 0.5
                    }
                }
                Strategy::Conditional => {
                    if outcomes.first().copied().unwrap_or(false) {
                        outcomes.get(1).copied().unwrap_or(false)
                    } else {
                        false
                    }
                }
                Strategy::Sequential | Strategy::Tolerance => unreachable!("handled above"),
            }
        }
    };

    apply_bridge(personality, combined, composite.bridge_for(personality.mood()))
}

/// The trial function registration's Monte-Carlo validator samples.
/// `Strategy::Tolerance` composites have no boolean `cond`, so they are
/// sampled against a pair of identical operands (the closest case) rather
/// than through `evaluate_strategy`, which would panic on them.
fn sample_for_registration(personality: &Personality, composite: &CompositeConstruct) -> bool {
    match composite.strategy {
        Strategy::Tolerance => evaluate_tolerance_trial(personality, composite, 1.0, 1.0),
        _ => evaluate_strategy(personality, composite, true),
    }
}

fn evaluate_tolerance_trial(personality: &Personality, composite: &CompositeConstruct, a: f64, b: f64) -> bool {
    let close = runtime::ish_comparison(personality, a, b, composite.close_tolerance);
    apply_bridge(personality, close, composite.bridge_for(personality.mood()))
}

fn builtin_sorta() -> CompositeConstruct {
    let mut targets = HashMap::new();
    targets.insert(Mood::Reliable, 0.95);
    targets.insert(Mood::Cautious, 0.85);
    targets.insert(Mood::Playful, 0.80);
    targets.insert(Mood::Chaotic, 0.60);

    // Derived from the raw union rate of `sometimes`/`maybe` at each mood
    // (1 - (1-p_sometimes)(1-p_maybe)) against the target above: negative
    // where the raw union overshoots the target, positive where it falls
    // short, zero where they already agree (playful).
    let mut bridges = HashMap::new();
    bridges.insert(Mood::Reliable, -0.047619);
    bridges.insert(Mood::Cautious, -0.081081);
    bridges.insert(Mood::Chaotic, 0.047619);

    CompositeConstruct::new("sorta", Strategy::Union, vec!["sometimes".to_string(), "maybe".to_string()])
        .with_target_probabilities(targets)
        .with_bridges(bridges)
        .with_tolerance(0.05)
        .with_cache_policy(CachePolicy::DeterministicOnly)
}
