//! Block-opener emission: building the host-language line for each
//! registered block construct and describing how its block is closed.

/// How an open block is detected as closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosingStyle {
    /// Closed by a line whose trimmed content is exactly `}`.
    Brace,
    /// Closed by a dedent back to (or past) the opener's indentation.
    Dedent,
}

/// An open block context.
pub struct BlockFrame {
    pub construct: &'static str,
    pub opened_at_line: usize,
    pub indent: usize,
    pub closing: ClosingStyle,
}

/// Builds the emitted opener line and the frame describing how the block
/// that follows is closed, for a matched block-opener construct. Returns
/// `None` for constructs this module does not know how to emit (should not
/// happen for anything the registry matched).
pub fn emit_opener(
    construct: &'static str,
    indent: &str,
    captures: &regex::Captures,
    line_number: usize,
) -> Option<(String, BlockFrame)> {
    let text = match construct {
        "sometimes_block" => format!("{indent}if sometimes({}):", captures["cond"].trim()),
        "maybe_for" => format!("{indent}for {} in maybe_for({}):", &captures["var"], captures["iter"].trim()),
        "sometimes_while" => format!("{indent}for _ in sometimes_while(lambda: {}):", captures["cond"].trim()),
        "kinda_repeat" => format!("{indent}for _ in range(kinda_repeat_count({})):", captures["n"].trim()),
        "eventually_until" => format!("{indent}for _ in eventually_until(lambda: {}):", captures["cond"].trim()),
        _ => return None,
    };
    let closing = if construct == "sometimes_block" { ClosingStyle::Brace } else { ClosingStyle::Dedent };
    let frame = BlockFrame { construct, opened_at_line: line_number, indent: indent.len(), closing };
    Some((text, frame))
}
