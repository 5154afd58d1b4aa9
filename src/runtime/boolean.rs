//! Boolean probabilistic gates: `sometimes`, `maybe`, `rarely`, `probably`.

use crate::personality::Personality;

fn gate(personality: &Personality, construct_name: &str, cond: bool) -> bool {
    // cascade_depth reflects nesting of enclosing probabilistic block
    // bodies, not this call itself; callers that execute a nested block
    // after a gate passes are responsible for wrapping that body in its
    // own `cascade_enter()` guard.
    let result = cond && personality.random() < personality.probability(construct_name);
    // A typed `bool` input can never be "not boolean-coercible" in Rust,
    // so there is no failure mode here; the call exists purely to keep
    // every probabilistic outcome flowing through update_chaos_state.
    personality.update_chaos_state(false);
    result
}

/// `~sometimes` gate. Returns `cond && rng < probability("sometimes")`.
pub fn sometimes(personality: &Personality, cond: bool) -> bool {
    gate(personality, "sometimes", cond)
}

/// `~maybe` gate. Analogous to [`sometimes`] with `probability("maybe")`.
pub fn maybe(personality: &Personality, cond: bool) -> bool {
    gate(personality, "maybe", cond)
}

/// `~rarely` gate. Analogous to [`sometimes`] with `probability("rarely")`.
pub fn rarely(personality: &Personality, cond: bool) -> bool {
    gate(personality, "rarely", cond)
}

/// `~probably` gate. Analogous to [`sometimes`] with `probability("probably")`.
pub fn probably(personality: &Personality, cond: bool) -> bool {
    gate(personality, "probably", cond)
}
