//! Process-wide personality/chaos runtime.
//!
//! `Personality` is realized as an injectable context handle rather than
//! a bare global, but a process-wide default is still available via
//! [`Personality::global`] so that callers which never construct their
//! own handle still observe a single shared instance.

pub mod profile;

use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock};

/// Categorical mood component of personality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Reliable,
    Cautious,
    Playful,
    Chaotic,
}

impl Mood {
    pub fn name(&self) -> &'static str {
        match self {
            Mood::Reliable => "reliable",
            Mood::Cautious => "cautious",
            Mood::Playful => "playful",
            Mood::Chaotic => "chaotic",
        }
    }

    /// All moods, reliable-to-chaotic, the order used by the probability table.
    pub fn all() -> [Mood; 4] {
        [Mood::Reliable, Mood::Cautious, Mood::Playful, Mood::Chaotic]
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reliable" => Ok(Mood::Reliable),
            "cautious" => Ok(Mood::Cautious),
            "playful" => Ok(Mood::Playful),
            "chaotic" => Ok(Mood::Chaotic),
            other => Err(format!("unknown mood: {other}")),
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

struct PersonalityState {
    mood: Mood,
    chaos_level: u8,
    seed: Option<u64>,
    rng: StdRng,
    instability: f64,
    cascade_depth: u32,
}

impl PersonalityState {
    fn new(mood: Mood, chaos_level: u8, seed: Option<u64>) -> Result<Self> {
        if !(1..=10).contains(&chaos_level) {
            return Err(Error::InvalidChaosLevel(chaos_level));
        }
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            mood,
            chaos_level,
            seed,
            rng,
            instability: 0.0,
            cascade_depth: 0,
        })
    }
}

/// Shared handle to a Personality context.
///
/// Cloning a `Personality` clones the handle, not the state: all clones
/// observe and mutate the same underlying [`PersonalityState`].
#[derive(Clone)]
pub struct Personality(Arc<Mutex<PersonalityState>>);

static GLOBAL: OnceLock<Mutex<Personality>> = OnceLock::new();

impl Personality {
    /// Construct a standalone Personality (for tests or embedders that
    /// want an isolated instance rather than the process-wide default).
    pub fn new(mood: Mood, chaos_level: u8, seed: Option<u64>) -> Result<Self> {
        Ok(Self(Arc::new(Mutex::new(PersonalityState::new(
            mood,
            chaos_level,
            seed,
        )?))))
    }

    /// Initialize or force-reset the process-wide Personality.
    ///
    /// Idempotent in the sense that repeated calls with the same
    /// arguments leave observable state equivalent; calling again with
    /// different arguments is the documented way tests and the CLI force
    /// a reset.
    pub fn configure(mood: Mood, chaos_level: u8, seed: Option<u64>) -> Result<Self> {
        let fresh = Self::new(mood, chaos_level, seed)?;
        match GLOBAL.get() {
            Some(cell) => {
                *cell.lock().expect("personality mutex poisoned") = fresh.clone();
            }
            None => {
                let _ = GLOBAL.set(Mutex::new(fresh.clone()));
            }
        }
        tracing::debug!(mood = %mood, chaos_level, seed = ?seed, "personality configured");
        Ok(fresh)
    }

    /// The process-wide Personality, initialized to documented defaults
    /// (`mood = playful`, `chaos_level = 5`, no seed) on first access.
    pub fn global() -> Self {
        GLOBAL
            .get_or_init(|| {
                Mutex::new(
                    Personality::new(Mood::Playful, 5, None)
                        .expect("default personality configuration is always valid"),
                )
            })
            .lock()
            .expect("personality mutex poisoned")
            .clone()
    }

    pub fn mood(&self) -> Mood {
        self.0.lock().expect("personality mutex poisoned").mood
    }

    pub fn chaos_level(&self) -> u8 {
        self.0.lock().expect("personality mutex poisoned").chaos_level
    }

    pub fn seed(&self) -> Option<u64> {
        self.0.lock().expect("personality mutex poisoned").seed
    }

    pub fn instability(&self) -> f64 {
        self.0.lock().expect("personality mutex poisoned").instability
    }

    pub fn cascade_depth(&self) -> u32 {
        self.0.lock().expect("personality mutex poisoned").cascade_depth
    }

    /// Uniform real in `[0.0, 1.0)`. The sole randomness source for every
    /// runtime helper.
    pub fn random(&self) -> f64 {
        self.0
            .lock()
            .expect("personality mutex poisoned")
            .rng
            .gen_range(0.0..1.0)
    }

    /// Base probability for `construct_name`, adjusted by chaos level and
    /// cascade depth.
    pub fn probability(&self, construct_name: &str) -> f64 {
        let (mood, chaos_level, cascade_depth) = {
            let state = self.0.lock().expect("personality mutex poisoned");
            (state.mood, state.chaos_level, state.cascade_depth)
        };
        let base = profile::base_probability(construct_name, mood);
        let chaos_scale = (f64::from(chaos_level) / 5.0).clamp(0.05, 1.0);
        let cascade_attenuation = (1.0 / (1.0 + f64::from(cascade_depth))).max(0.05);
        let result = (base * chaos_scale * cascade_attenuation).clamp(0.0, 1.0);
        tracing::trace!(construct_name, base, chaos_scale, cascade_attenuation, result, "probability");
        result
    }

    /// Uniform choice over a finite, non-empty slice.
    pub fn choice<'a, T>(&self, options: &'a [T]) -> Option<&'a T> {
        if options.is_empty() {
            return None;
        }
        let idx = ((self.random() * options.len() as f64) as usize).min(options.len() - 1);
        options.get(idx)
    }

    /// Record the outcome of a runtime helper invocation.
    pub fn update_chaos_state(&self, failed: bool) {
        let mut state = self.0.lock().expect("personality mutex poisoned");
        if failed {
            state.instability = (state.instability + 0.02).min(1.0);
        } else {
            state.instability = (state.instability - 0.01).max(0.0);
        }
    }

    /// Enter a cascade level. The returned guard exits the cascade on
    /// drop, enforcing strict stack discipline without relying on callers
    /// to remember a matching `cascade_exit`.
    #[must_use]
    pub fn cascade_enter(&self) -> CascadeGuard {
        self.0.lock().expect("personality mutex poisoned").cascade_depth += 1;
        CascadeGuard { personality: self.clone() }
    }
}

impl std::fmt::Debug for Personality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.0.lock().expect("personality mutex poisoned");
        f.debug_struct("Personality")
            .field("mood", &state.mood)
            .field("chaos_level", &state.chaos_level)
            .field("seed", &state.seed)
            .field("instability", &state.instability)
            .field("cascade_depth", &state.cascade_depth)
            .finish()
    }
}

/// RAII guard produced by [`Personality::cascade_enter`].
pub struct CascadeGuard {
    personality: Personality,
}

impl Drop for CascadeGuard {
    fn drop(&mut self) {
        let mut state = self.personality.0.lock().expect("personality mutex poisoned");
        state.cascade_depth = state.cascade_depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reproducible_with_same_seed() {
        let a = Personality::new(Mood::Reliable, 5, Some(42)).unwrap();
        let b = Personality::new(Mood::Reliable, 5, Some(42)).unwrap();
        let seq_a: Vec<f64> = (0..10).map(|_| a.random()).collect();
        let seq_b: Vec<f64> = (0..10).map(|_| b.random()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn invalid_chaos_level_rejected() {
        assert!(Personality::new(Mood::Reliable, 0, None).is_err());
        assert!(Personality::new(Mood::Reliable, 11, None).is_err());
        assert!(Personality::new(Mood::Reliable, 1, None).is_ok());
        assert!(Personality::new(Mood::Reliable, 10, None).is_ok());
    }

    #[test]
    fn probability_scales_with_chaos_level() {
        let low = Personality::new(Mood::Reliable, 1, Some(1)).unwrap();
        let high = Personality::new(Mood::Reliable, 10, Some(1)).unwrap();
        assert!(low.probability("sometimes") < high.probability("sometimes"));
    }

    #[test]
    fn probability_attenuates_with_cascade_depth() {
        let p = Personality::new(Mood::Reliable, 5, Some(1)).unwrap();
        let shallow = p.probability("sometimes");
        let _guard = p.cascade_enter();
        let deep = p.probability("sometimes");
        assert!(deep < shallow);
    }

    #[test]
    fn cascade_guard_pairs_strictly() {
        let p = Personality::new(Mood::Reliable, 5, Some(1)).unwrap();
        assert_eq!(p.cascade_depth(), 0);
        {
            let _g1 = p.cascade_enter();
            assert_eq!(p.cascade_depth(), 1);
            {
                let _g2 = p.cascade_enter();
                assert_eq!(p.cascade_depth(), 2);
            }
            assert_eq!(p.cascade_depth(), 1);
        }
        assert_eq!(p.cascade_depth(), 0);
    }

    #[test]
    fn update_chaos_state_clamps() {
        let p = Personality::new(Mood::Reliable, 5, Some(1)).unwrap();
        for _ in 0..200 {
            p.update_chaos_state(true);
        }
        assert_eq!(p.instability(), 1.0);
        for _ in 0..200 {
            p.update_chaos_state(false);
        }
        assert_eq!(p.instability(), 0.0);
    }

    #[test]
    fn choice_is_empty_safe() {
        let p = Personality::new(Mood::Reliable, 5, Some(1)).unwrap();
        let empty: Vec<i32> = vec![];
        assert_eq!(p.choice(&empty), None);
        let one = vec![7];
        assert_eq!(p.choice(&one), Some(&7));
    }

    #[test]
    fn configure_resets_global() {
        Personality::configure(Mood::Reliable, 3, Some(9)).unwrap();
        let first = Personality::global();
        assert_eq!(first.mood(), Mood::Reliable);
        assert_eq!(first.chaos_level(), 3);

        Personality::configure(Mood::Chaotic, 8, Some(1)).unwrap();
        let second = Personality::global();
        assert_eq!(second.mood(), Mood::Chaotic);
        assert_eq!(second.chaos_level(), 8);
    }
}
