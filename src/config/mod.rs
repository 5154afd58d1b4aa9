//! Layered personality configuration.
//!
//! Three tiers, highest priority first: explicit CLI flags, then
//! `KINDA_MOOD` / `KINDA_CHAOS_LEVEL` / `KINDA_SEED` environment
//! variables, then documented defaults. There is no persisted
//! configuration file; every run resolves its personality fresh.

use crate::error::{Error, Result};
use crate::personality::Mood;
use std::str::FromStr;

/// Default mood/chaos level when neither CLI flags nor environment
/// variables specify one (matches [`crate::personality::Personality::global`]).
pub const DEFAULT_MOOD: Mood = Mood::Playful;
pub const DEFAULT_CHAOS_LEVEL: u8 = 5;

pub const ENV_MOOD: &str = "KINDA_MOOD";
pub const ENV_CHAOS_LEVEL: &str = "KINDA_CHAOS_LEVEL";
pub const ENV_SEED: &str = "KINDA_SEED";

/// Resolved personality configuration for a single run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindaConfig {
    pub mood: Mood,
    pub chaos_level: u8,
    pub seed: Option<u64>,
}

impl Default for KindaConfig {
    fn default() -> Self {
        Self { mood: DEFAULT_MOOD, chaos_level: DEFAULT_CHAOS_LEVEL, seed: None }
    }
}

impl KindaConfig {
    /// Environment-only layer: defaults overridden by `KINDA_*` variables,
    /// if present and parseable. An unparseable variable is ignored rather
    /// than treated as an error; it falls back to the default for that
    /// field.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(ENV_MOOD) {
            if let Ok(mood) = Mood::from_str(&raw) {
                config.mood = mood;
            } else {
                tracing::warn!(value = %raw, "ignoring unparseable {ENV_MOOD}");
            }
        }
        if let Ok(raw) = std::env::var(ENV_CHAOS_LEVEL) {
            match raw.parse::<u8>() {
                Ok(level) if (1..=10).contains(&level) => config.chaos_level = level,
                _ => tracing::warn!(value = %raw, "ignoring invalid {ENV_CHAOS_LEVEL}"),
            }
        }
        if let Ok(raw) = std::env::var(ENV_SEED) {
            match raw.parse::<u64>() {
                Ok(seed) => config.seed = Some(seed),
                Err(_) => tracing::warn!(value = %raw, "ignoring unparseable {ENV_SEED}"),
            }
        }
        config
    }

    /// Layers explicit CLI overrides on top of the environment/default
    /// layer. `None` fields fall through to whatever `from_env` resolved.
    pub fn resolve(cli_mood: Option<Mood>, cli_chaos_level: Option<u8>, cli_seed: Option<u64>) -> Result<Self> {
        let env_layer = Self::from_env();
        let chaos_level = cli_chaos_level.unwrap_or(env_layer.chaos_level);
        if !(1..=10).contains(&chaos_level) {
            return Err(Error::InvalidChaosLevel(chaos_level));
        }
        Ok(Self {
            mood: cli_mood.unwrap_or(env_layer.mood),
            chaos_level,
            seed: cli_seed.or(env_layer.seed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize tests that touch
    // them so they don't interleave with each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        std::env::remove_var(ENV_MOOD);
        std::env::remove_var(ENV_CHAOS_LEVEL);
        std::env::remove_var(ENV_SEED);
    }

    #[test]
    fn defaults_when_nothing_set() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        let config = KindaConfig::resolve(None, None, None).unwrap();
        assert_eq!(config.mood, DEFAULT_MOOD);
        assert_eq!(config.chaos_level, DEFAULT_CHAOS_LEVEL);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn env_overrides_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_MOOD, "chaotic");
        std::env::set_var(ENV_CHAOS_LEVEL, "9");
        std::env::set_var(ENV_SEED, "42");
        let config = KindaConfig::resolve(None, None, None).unwrap();
        assert_eq!(config.mood, Mood::Chaotic);
        assert_eq!(config.chaos_level, 9);
        assert_eq!(config.seed, Some(42));
        clear_env();
    }

    #[test]
    fn cli_overrides_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_MOOD, "chaotic");
        let config = KindaConfig::resolve(Some(Mood::Reliable), Some(2), Some(7)).unwrap();
        assert_eq!(config.mood, Mood::Reliable);
        assert_eq!(config.chaos_level, 2);
        assert_eq!(config.seed, Some(7));
        clear_env();
    }

    #[test]
    fn invalid_chaos_level_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        assert!(KindaConfig::resolve(None, Some(0), None).is_err());
        assert!(KindaConfig::resolve(None, Some(11), None).is_err());
    }
}
