//! `~sorta print`: probabilistic stdout.

use crate::personality::Personality;
use std::io::{self, Write};

/// Canned "shrug response" emitted when `sorta_print` decides not to print.
const SHRUG_RESPONSES: &[&str] = &[
    "[shrug] meh, maybe later",
    "[shrug] not feeling it right now",
    "[shrug] eh, who's counting",
    "[shrug] ask me again sometime",
];

/// Writes either `"[print] " + joined args` or a shrug response to
/// `writer`, chosen with `probability("sorta_print")`.
///
/// This is the form used by unit tests; [`sorta_print`] is the
/// stdout-writing convenience wrapper emitted code actually calls.
pub fn sorta_print_to<W: Write>(personality: &Personality, args: &[String], writer: &mut W) -> io::Result<()> {
    let roll = personality.random() < personality.probability("sorta_print");
    personality.update_chaos_state(false);
    if roll {
        writeln!(writer, "[print] {}", args.join(" "))
    } else {
        let response = personality
            .choice(SHRUG_RESPONSES)
            .copied()
            .unwrap_or("[shrug]");
        writeln!(writer, "{response}")
    }
}

/// `~sorta print(*args)`. Writes to stdout; never returns a value to the
/// caller, matching the Python contract's `None` return.
pub fn sorta_print(personality: &Personality, args: &[String]) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    // A write failure to stdout is not a fuzzy-runtime failure; it is
    // swallowed the way `print()` failures are in practice.
    let _ = sorta_print_to(personality, args, &mut handle);
}
