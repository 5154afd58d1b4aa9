//! Centralized error types for kinda-lang-core.
//!
//! Registration-time failures (duplicate names, unresolved dependencies,
//! cycles, failed statistical validation) are the only errors that
//! propagate to callers. Everything else (transform diagnostics, runtime
//! helper failures) is represented as data, not as an `Err`.

use thiserror::Error;

/// Primary error type for kinda-lang-core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // --- Personality errors ---
    /// `chaos_level` was outside the documented `1..=10` range.
    #[error("chaos level {0} out of range (must be 1..=10)")]
    InvalidChaosLevel(u8),

    /// `cascade_exit` called without a matching `cascade_enter`.
    #[error("cascade_exit called with no matching cascade_enter")]
    UnbalancedCascade,

    // --- Registry errors ---
    /// A construct descriptor name collided with an already-registered one.
    #[error("construct already registered: {0}")]
    DuplicateConstruct(String),

    /// A construct's regex pattern failed to compile.
    #[error("bad pattern for construct {name}: {source}")]
    BadPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    // --- Composition errors ---
    /// A composite construct named a component that is not registered.
    #[error("composite {composite} depends on unregistered construct {dependency}")]
    UnresolvedDependency { composite: String, dependency: String },

    /// A composite construct's components formed a dependency cycle.
    #[error("dependency cycle detected: {0}")]
    DependencyCycle(String),

    /// A composite name collided with an already-registered one.
    #[error("composite already registered: {0}")]
    DuplicateComposite(String),

    /// A composite did not declare a target probability for every mood.
    #[error("composite {0} missing target_probabilities for one or more moods")]
    IncompleteTargetProbabilities(String),

    /// Monte-Carlo validation found the observed rate too far from target.
    #[error(
        "composite {composite} failed statistical validation for mood {mood}: observed {observed:.3}, target {target:.3}, tolerance {tolerance:.3}"
    )]
    StatisticalValidationFailed {
        composite: String,
        mood: String,
        observed: f64,
        target: f64,
        tolerance: f64,
    },

    /// A composite was evaluated through the wrong entry point: a boolean
    /// composite through `evaluate_tolerance`, or a `Strategy::Tolerance`
    /// composite through `evaluate`.
    #[error("composite {composite} must be evaluated via {expected}")]
    WrongEvaluationEntryPoint { composite: String, expected: &'static str },

    // --- Transformer errors (internal; surfaced as Diagnostic, not Err) ---
    /// Wraps an I/O failure encountered while reading/writing source files.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;
