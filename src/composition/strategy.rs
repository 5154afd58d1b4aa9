//! Combination strategies a composite construct evaluates its components
//! under.

/// How a composite's component outcomes combine into one boolean result.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// True iff at least one component is true.
    Union,
    /// True iff every component is true.
    Intersection,
    /// True iff at least `usize` components are true.
    Threshold(usize),
    /// Components are tried in order; the first true result short-circuits
    /// the rest.
    Sequential,
    /// True iff the weighted fraction of true components reaches 0.5.
    /// Weights align positionally with the composite's `components`.
    Weighted(Vec<f64>),
    /// Exactly two components: the second is evaluated only if the first
    /// is true, and its result gates the overall outcome.
    Conditional,
    /// Numeric-closeness composition underlying `~ish`-flavored composites.
    /// Takes no boolean `cond`; evaluated only through
    /// `CompositeRegistry::evaluate_tolerance`, never through
    /// `CompositeRegistry::evaluate`.
    Tolerance,
}
