//! Inline rewrites applied to every line before whole-line construct
//! matching.

use crate::validation::SecurityScanner;
use regex::Regex;
use std::sync::OnceLock;

fn kinda_decl_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<indent>\s*)~kinda\s+(?P<ty>int|float|bool)\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?P<expr>.+)$")
            .expect("kinda declaration pattern is valid")
    })
}

fn welp_assignment_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<prefix>\s*\S[^=]*=\s*)(?P<expr>.+?)\s*~welp\s*(?P<fallback>.+)$")
            .expect("welp assignment pattern is valid")
    })
}

fn welp_bare_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<indent>\s*)(?P<expr>.+?)\s*~welp\s*(?P<fallback>.+)$")
            .expect("welp bare pattern is valid")
    })
}

fn ish_assignment_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?P<prefix>=\s*)~ish\s+(?P<value>.+)$").expect("ish assignment pattern is valid")
    })
}

fn ish_comparison_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?P<a>[A-Za-z0-9_.\[\]]+)\s*~ish\s*(?P<b>[A-Za-z0-9_.\[\]]+)")
            .expect("ish comparison pattern is valid")
    })
}

/// Result of applying inline rewrites to a single line.
pub struct RewriteResult {
    pub text: String,
    pub helpers: Vec<&'static str>,
    /// Set if a captured argument failed the security scan; the offending
    /// rewrite is skipped (the line keeps its pre-rewrite text for that
    /// category) and the caller is expected to turn the whole line into a
    /// no-op comment.
    pub violation: Option<crate::validation::SecurityViolation>,
}

/// Applies every inline rewrite category to `line`, threading the result of
/// each through to the next. Returns the rewritten text and the set of
/// runtime helpers it now references. Captured arguments are scanned with
/// `scanner` before being embedded in the rewritten output.
pub fn apply(line: &str, scanner: &SecurityScanner) -> RewriteResult {
    let mut text = line.to_string();
    let mut helpers = Vec::new();

    if let Some(caps) = kinda_decl_pattern().captures(&text) {
        let expr = caps["expr"].trim();
        if let Err(violation) = scanner.validate_argument(expr) {
            return RewriteResult { text, helpers, violation: Some(violation) };
        }
        if let Err(violation) = scanner.validate_identifier(&caps["name"]) {
            return RewriteResult { text, helpers, violation: Some(violation) };
        }
        let helper = match &caps["ty"] {
            "int" => "kinda_int",
            "float" => "kinda_float",
            "bool" => "kinda_bool",
            other => unreachable!("kinda declaration pattern only captures int|float|bool, got {other}"),
        };
        text = format!("{}{} = {}({})", &caps["indent"], &caps["name"], helper, expr);
        helpers.push(helper);
        return RewriteResult { text, helpers, violation: None };
    }

    if let Some(caps) = welp_assignment_pattern().captures(&text) {
        let expr = caps["expr"].trim().to_string();
        let fallback = caps["fallback"].trim().to_string();
        if let Err(violation) = scanner.validate_argument(&expr).and(scanner.validate_argument(&fallback)) {
            return RewriteResult { text, helpers, violation: Some(violation) };
        }
        text = format!("{}welp(lambda: {}, {})", &caps["prefix"], expr, fallback);
        helpers.push("welp");
        return RewriteResult { text, helpers, violation: None };
    }
    if let Some(caps) = welp_bare_pattern().captures(&text) {
        let expr = caps["expr"].trim().to_string();
        let fallback = caps["fallback"].trim().to_string();
        if let Err(violation) = scanner.validate_argument(&expr).and(scanner.validate_argument(&fallback)) {
            return RewriteResult { text, helpers, violation: Some(violation) };
        }
        text = format!("{}welp(lambda: {}, {})", &caps["indent"], expr, fallback);
        helpers.push("welp");
        return RewriteResult { text, helpers, violation: None };
    }

    if let Some(caps) = ish_assignment_pattern().captures(&text) {
        let value = caps["value"].trim().to_string();
        if let Err(violation) = scanner.validate_argument(&value) {
            return RewriteResult { text, helpers, violation: Some(violation) };
        }
        let whole = caps.get(0).expect("capture group 0 always present").as_str().to_string();
        let replacement = format!("{}ish_value({})", &caps["prefix"], value);
        text = text.replacen(&whole, &replacement, 1);
        helpers.push("ish_value");
    } else if let Some(caps) = ish_comparison_pattern().captures(&text) {
        let a = caps["a"].to_string();
        let b = caps["b"].to_string();
        if let Err(violation) = scanner.validate_argument(&a).and(scanner.validate_argument(&b)) {
            return RewriteResult { text, helpers, violation: Some(violation) };
        }
        let whole = caps.get(0).expect("capture group 0 always present").as_str().to_string();
        let replacement = format!("ish_comparison({}, {})", a, b);
        text = text.replacen(&whole, &replacement, 1);
        helpers.push("ish_comparison");
    }

    RewriteResult { text, helpers, violation: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_kinda_int_declaration() {
        let result = apply("~kinda int x = 5", &SecurityScanner::new());
        assert_eq!(result.text, "x = kinda_int(5)");
        assert_eq!(result.helpers, vec!["kinda_int"]);
    }

    #[test]
    fn rewrites_kinda_float_declaration_preserving_indent() {
        let result = apply("    ~kinda float y = compute()", &SecurityScanner::new());
        assert_eq!(result.text, "    y = kinda_float(compute())");
    }

    #[test]
    fn rewrites_welp_after_assignment() {
        let result = apply("result = risky() ~welp 0", &SecurityScanner::new());
        assert_eq!(result.text, "result = welp(lambda: risky(), 0)");
        assert_eq!(result.helpers, vec!["welp"]);
    }

    #[test]
    fn rewrites_ish_comparison_inside_condition() {
        let result = apply("if x ~ish y:", &SecurityScanner::new());
        assert_eq!(result.text, "if ish_comparison(x, y):");
        assert_eq!(result.helpers, vec!["ish_comparison"]);
    }

    #[test]
    fn rewrites_ish_assignment_form() {
        let result = apply("x = ~ish 5.0", &SecurityScanner::new());
        assert_eq!(result.text, "x = ish_value(5.0)");
        assert_eq!(result.helpers, vec!["ish_value"]);
    }

    #[test]
    fn leaves_plain_lines_untouched() {
        let result = apply("print(\"hello\")", &SecurityScanner::new());
        assert_eq!(result.text, "print(\"hello\")");
        assert!(result.helpers.is_empty());
    }

    #[test]
    fn flags_unsafe_kinda_declaration() {
        let result = apply("~kinda int x = __import__('os').system('ls')", &SecurityScanner::new());
        assert!(result.violation.is_some());
    }

    #[test]
    fn flags_oversized_kinda_declaration_name() {
        let huge_name = "n".repeat(300);
        let line = format!("~kinda int {huge_name} = 5");
        let result = apply(&line, &SecurityScanner::new());
        assert!(result.violation.is_some());
    }
}
