//! `~welp` fallback combinator.

use crate::personality::Personality;
use std::panic::{self, UnwindSafe};

/// `EXPR ~welp FALLBACK`. Runs `thunk`; if it panics or returns `None`,
/// `fallback` is returned and the failure is recorded instead of
/// propagating.
pub fn welp<T, F>(personality: &Personality, thunk: F, fallback: T) -> T
where
    F: FnOnce() -> Option<T> + UnwindSafe,
{
    match panic::catch_unwind(thunk) {
        Ok(Some(value)) => {
            personality.update_chaos_state(false);
            value
        }
        Ok(None) => {
            personality.update_chaos_state(true);
            fallback
        }
        Err(_) => {
            personality.update_chaos_state(true);
            fallback
        }
    }
}
