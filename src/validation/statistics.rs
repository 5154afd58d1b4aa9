//! Monte-Carlo statistical validation and performance baselines.

use std::time::{Duration, Instant};

/// Result of running `trials` Bernoulli trials and summarizing the
/// observed success rate with a normal-approximation 95% confidence
/// interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloResult {
    pub observed: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub trials: u32,
}

/// Runs `trial` `trials` times and summarizes the observed `true` rate.
///
/// `trial` should be a closure wrapping a single boolean-producing
/// construct or composite evaluation; callers compare `observed` (or the
/// CI bounds) against a declared target probability.
pub fn monte_carlo<F: FnMut() -> bool>(mut trial: F, trials: u32) -> MonteCarloResult {
    let trials = trials.max(1);
    let successes = (0..trials).filter(|_| trial()).count() as f64;
    let observed = successes / f64::from(trials);
    let std_error = (observed * (1.0 - observed) / f64::from(trials)).sqrt();
    const Z_95: f64 = 1.96;
    MonteCarloResult {
        observed,
        ci_lower: (observed - Z_95 * std_error).max(0.0),
        ci_upper: (observed + Z_95 * std_error).min(1.0),
        trials,
    }
}

/// Mean and p95 wall-clock latency of `iterations` calls to `f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceBaseline {
    pub mean: Duration,
    pub p95: Duration,
}

pub fn performance_baseline<F: FnMut()>(mut f: F, iterations: u32) -> PerformanceBaseline {
    let iterations = iterations.max(1);
    let mut durations = Vec::with_capacity(iterations as usize);
    for _ in 0..iterations {
        let start = Instant::now();
        f();
        durations.push(start.elapsed());
    }
    durations.sort_unstable();

    let total: Duration = durations.iter().sum();
    let mean = total / iterations;
    let p95_idx = (((f64::from(iterations)) * 0.95) as usize).min(durations.len() - 1);
    PerformanceBaseline { mean, p95: durations[p95_idx] }
}
