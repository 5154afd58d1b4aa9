//! Probabilistic looping constructs: `sometimes_while`, `maybe_for`,
//! `kinda_repeat_count`, `eventually_until`.

use crate::personality::Personality;
use crate::runtime::boolean::{maybe, sometimes};
use crate::runtime::numeric::repeat_spread_for_mood;
use crate::runtime::{EVENTUALLY_UNTIL_DEFAULT_MAX_ITER, SOMETIMES_WHILE_MAX_ITER};
use std::collections::VecDeque;

/// Iterator returned by [`sometimes_while`].
pub struct SometimesWhile<F> {
    personality: Personality,
    cond: F,
    iterations: u64,
}

impl<F: FnMut() -> bool> Iterator for SometimesWhile<F> {
    type Item = ();

    fn next(&mut self) -> Option<()> {
        if self.iterations >= SOMETIMES_WHILE_MAX_ITER {
            self.personality.update_chaos_state(true);
            return None;
        }
        if !(self.cond)() {
            return None;
        }
        if !sometimes(&self.personality, true) {
            return None;
        }
        self.iterations += 1;
        Some(())
    }
}

/// `~sometimes_while cond:`. Yields while `cond_fn()` holds and a fresh
/// `sometimes(True)` roll passes, capped at
/// [`SOMETIMES_WHILE_MAX_ITER`] iterations.
pub fn sometimes_while<F: FnMut() -> bool>(personality: &Personality, cond_fn: F) -> SometimesWhile<F> {
    SometimesWhile { personality: personality.clone(), cond: cond_fn, iterations: 0 }
}

/// `~maybe_for x in xs:`. Yields each item for which `maybe(True)` holds.
pub fn maybe_for<I>(personality: &Personality, iterable: I) -> impl Iterator<Item = I::Item>
where
    I: IntoIterator,
{
    let personality = personality.clone();
    iterable.into_iter().filter(move |_| maybe(&personality, true))
}

/// `~kinda_repeat(n):` iteration count. Returns `n + delta`, `delta`
/// uniform in `[-floor(k*n), floor(k*n)]` (`k` per mood), clamped at 0
/// per the resolution recorded in DESIGN.md.
pub fn kinda_repeat_count(personality: &Personality, n: i64) -> i64 {
    let k = repeat_spread_for_mood(personality.mood());
    let spread = ((k * n as f64).floor() as i64).max(0);
    let delta = if spread == 0 {
        0
    } else {
        let span = 2 * spread + 1;
        let roll = ((personality.random() * span as f64) as i64).min(span - 1);
        roll - spread
    };
    personality.update_chaos_state(false);
    (n + delta).max(0)
}

/// Iterator returned by [`eventually_until`].
pub struct EventuallyUntil<F> {
    personality: Personality,
    cond: F,
    confidence: f64,
    window: usize,
    max_iter: u64,
    history: VecDeque<bool>,
    iterations: u64,
    done: bool,
}

impl<F: FnMut() -> bool> Iterator for EventuallyUntil<F> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.done {
            return None;
        }
        let outcome = (self.cond)();
        self.history.push_back(outcome);
        if self.history.len() > self.window {
            self.history.pop_front();
        }
        self.iterations += 1;

        let confident = self.history.len() == self.window
            && self.history.iter().filter(|held| **held).count() as f64 / self.window as f64
                >= self.confidence;

        if confident {
            self.personality.update_chaos_state(false);
            self.done = true;
        } else if self.iterations >= self.max_iter {
            self.personality.update_chaos_state(true);
            self.done = true;
        }
        Some(outcome)
    }
}

/// `~eventually_until cond:`. Re-evaluates `cond_fn` each iteration;
/// stops once the rolling fraction of `true` evaluations over the last
/// `window` iterations reaches `confidence`, or at `max_iter`.
pub fn eventually_until<F: FnMut() -> bool>(
    personality: &Personality,
    cond_fn: F,
    confidence: Option<f64>,
    window: Option<usize>,
    max_iter: Option<u64>,
) -> EventuallyUntil<F> {
    EventuallyUntil {
        personality: personality.clone(),
        cond: cond_fn,
        confidence: confidence.unwrap_or(0.95),
        window: window.unwrap_or(20).max(1),
        max_iter: max_iter.unwrap_or(EVENTUALLY_UNTIL_DEFAULT_MAX_ITER),
        history: VecDeque::new(),
        iterations: 0,
        done: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personality::Mood;

    #[test]
    fn sometimes_while_terminates_within_cap() {
        let p = Personality::new(Mood::Chaotic, 10, Some(1)).unwrap();
        let ticks = sometimes_while(&p, || true).count() as u64;
        assert!(ticks <= SOMETIMES_WHILE_MAX_ITER);
    }

    #[test]
    fn sometimes_while_stops_when_condition_false() {
        let p = Personality::new(Mood::Reliable, 5, Some(1)).unwrap();
        let mut remaining = 3;
        let ticks = sometimes_while(&p, || {
            if remaining == 0 {
                false
            } else {
                remaining -= 1;
                true
            }
        })
        .count();
        assert!(ticks <= 3);
    }

    #[test]
    fn maybe_for_yields_subset() {
        let p = Personality::new(Mood::Playful, 5, Some(42)).unwrap();
        let items: Vec<i32> = maybe_for(&p, vec![1, 2, 3, 4, 5]).collect();
        assert!(items.iter().all(|v| (1..=5).contains(v)));

        let p2 = Personality::new(Mood::Playful, 5, Some(42)).unwrap();
        let items2: Vec<i32> = maybe_for(&p2, vec![1, 2, 3, 4, 5]).collect();
        assert_eq!(items, items2, "same seed must reproduce the same subset");
    }

    #[test]
    fn kinda_repeat_count_reliable_mood_is_exact() {
        let p = Personality::new(Mood::Reliable, 5, Some(1)).unwrap();
        for _ in 0..20 {
            assert_eq!(kinda_repeat_count(&p, 5), 5);
        }
        assert_eq!(kinda_repeat_count(&p, 0), 0);
    }

    #[test]
    fn kinda_repeat_count_never_negative() {
        let p = Personality::new(Mood::Chaotic, 10, Some(1)).unwrap();
        for _ in 0..500 {
            assert!(kinda_repeat_count(&p, 1) >= 0);
            assert!(kinda_repeat_count(&p, 0) >= 0);
        }
    }

    #[test]
    fn eventually_until_terminates_within_max_iter() {
        let p = Personality::new(Mood::Chaotic, 5, Some(1)).unwrap();
        let ticks = eventually_until(&p, || false, Some(0.95), Some(20), Some(200)).count();
        assert!(ticks as u64 <= 200);
    }

    #[test]
    fn eventually_until_stops_early_when_always_true() {
        let p = Personality::new(Mood::Reliable, 5, Some(1)).unwrap();
        let ticks = eventually_until(&p, || true, Some(0.95), Some(10), Some(10_000)).count();
        assert_eq!(ticks, 10);
    }
}
