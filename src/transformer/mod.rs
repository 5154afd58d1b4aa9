//! Line-oriented scanner/code-generator.
//!
//! Translates `.knda` source into host-language text plus a runtime-import
//! prologue, collecting diagnostics along the way. The transformer itself
//! is deterministic and touches no RNG.

mod blocks;
mod inline;

use crate::registry::{ConstructKind, Registry};
use crate::validation::SecurityScanner;
use blocks::{BlockFrame, ClosingStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Severity of a single diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// A single transform-time diagnostic.
///
/// Serializable so embedders that consume diagnostics across a process
/// boundary (e.g. an editor plugin) get structured data rather than a
/// formatted string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
}

/// Result of transforming one `.knda` source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOutput {
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
    /// `0` iff no `Severity::Error` diagnostics were recorded.
    pub exit_status: i32,
}

fn unknown_construct_pattern() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"^\s*~(?P<name>[A-Za-z_][A-Za-z0-9_]*)").expect("unknown-construct pattern is valid")
    })
}

/// Translates `source` into host-language text, collecting the diagnostics
/// and `used_helpers` the transformer's state records.
pub fn transform(source: &str) -> TransformOutput {
    let normalized = source.replace("\r\n", "\n");
    let registry = Registry::global();
    let scanner = SecurityScanner::new();

    let mut used_helpers: BTreeSet<&'static str> = BTreeSet::new();
    let mut body: Vec<String> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut block_stack: Vec<BlockFrame> = Vec::new();

    // `str::lines` drops a single trailing newline without inventing an
    // extra blank final line, and yields nothing for an empty file.
    let lines: Vec<&str> = normalized.lines().collect();

    for (idx, raw_line) in lines.iter().enumerate() {
        let line_number = idx + 1;
        let indent_len = raw_line.len() - raw_line.trim_start().len();
        let indent = &raw_line[..indent_len];
        let trimmed = raw_line.trim_start();
        let is_blank = trimmed.trim_end().is_empty();

        // Close any Dedent-style blocks this line's indentation has
        // stepped back out of.
        if !is_blank {
            while let Some(top) = block_stack.last() {
                if top.closing == ClosingStyle::Dedent && indent_len <= top.indent {
                    block_stack.pop();
                } else {
                    break;
                }
            }
        }

        // An explicit `}` closes the innermost Brace-style block and emits
        // nothing of its own.
        if trimmed.trim_end() == "}" {
            match block_stack.last() {
                Some(top) if top.closing == ClosingStyle::Brace => {
                    block_stack.pop();
                    continue;
                }
                _ => {
                    // Stray brace with nothing open: pass through unchanged.
                    body.push(raw_line.to_string());
                    continue;
                }
            }
        }

        if is_blank {
            body.push(raw_line.to_string());
            continue;
        }

        let rewrite = inline::apply(trimmed, &scanner);
        if let Some(violation) = rewrite.violation {
            diagnostics.push(Diagnostic {
                line: line_number,
                column: indent_len + 1,
                severity: Severity::Error,
                code: "E_UNSAFE_ARG",
                message: violation.reason,
            });
            body.push(format!("{indent}# {trimmed}"));
            continue;
        }
        used_helpers.extend(rewrite.helpers.iter().copied());
        let rewritten = rewrite.text;

        let matched = registry
            .iter_in_priority_order()
            .find_map(|descriptor| descriptor.pattern.captures(&rewritten).map(|caps| (descriptor, caps)));

        let Some((descriptor, caps)) = matched else {
            if let Some(unknown) = unknown_construct_pattern().captures(&rewritten) {
                diagnostics.push(Diagnostic {
                    line: line_number,
                    column: indent_len + 1,
                    severity: Severity::Warning,
                    code: "W_UNKNOWN_CONSTRUCT",
                    message: format!("unrecognized construct `~{}`", &unknown["name"]),
                });
            }
            body.push(format!("{indent}{rewritten}"));
            continue;
        };

        // `maybe_for` binds an identifier (`var`), not an expression, so it
        // is checked against the identifier cap rather than the argument
        // cap; every other captured group in every descriptor is an
        // expression/condition and goes through `validate_argument`.
        let captured_args_safe = if descriptor.name == "maybe_for" {
            caps.name("var").is_some_and(|m| scanner.validate_identifier(m.as_str()).is_ok())
                && caps.name("iter").is_some_and(|m| scanner.validate_argument(m.as_str()).is_ok())
        } else {
            caps.iter().skip(1).flatten().all(|m| scanner.validate_argument(m.as_str()).is_ok())
        };
        if !captured_args_safe {
            diagnostics.push(Diagnostic {
                line: line_number,
                column: indent_len + 1,
                severity: Severity::Error,
                code: "E_UNSAFE_ARG",
                message: format!("construct `{}` rejected an unsafe captured argument", descriptor.name),
            });
            body.push(format!("{indent}# {trimmed}"));
            continue;
        }

        used_helpers.extend(descriptor.runtime_helpers.iter().copied());

        match descriptor.kind {
            ConstructKind::BlockOpener => {
                match blocks::emit_opener(descriptor.name, indent, &caps, line_number) {
                    Some((text, frame)) => {
                        body.push(text);
                        block_stack.push(frame);
                    }
                    None => body.push(format!("{indent}{rewritten}")),
                }
            }
            ConstructKind::Print => {
                let args = caps.name("args").map(|m| m.as_str()).unwrap_or_default();
                body.push(format!("{indent}sorta_print({args})"));
            }
            ConstructKind::Declaration | ConstructKind::Expression | ConstructKind::Statement => {
                body.push(format!("{indent}{rewritten}"));
            }
        }
    }

    // Dedent-style blocks close implicitly at EOF, nothing to flag. Only a
    // Brace-style block still open at EOF is a genuine unbalanced brace.
    for frame in block_stack.iter().filter(|f| f.closing == ClosingStyle::Brace) {
        diagnostics.push(Diagnostic {
            line: frame.opened_at_line,
            column: frame.indent + 1,
            severity: Severity::Error,
            code: "E_BLOCK_UNCLOSED",
            message: format!("block opened by `{}` was never closed", frame.construct),
        });
    }

    // `E_BLOCK_UNCLOSED` diagnostics are discovered only after the whole
    // file has been scanned, so they must be merged back into source-line
    // order rather than trailing behind diagnostics from later lines.
    diagnostics.sort_by_key(|d| (d.line, d.column));

    let prologue = if used_helpers.is_empty() {
        String::new()
    } else {
        let helper_list: Vec<&str> = used_helpers.into_iter().collect();
        format!("from kinda.runtime import {}\n", helper_list.join(", "))
    };

    let code = if body.is_empty() { prologue } else { format!("{prologue}{}", body.join("\n")) };

    let exit_status = if diagnostics.iter().any(|d| d.severity == Severity::Error) { 1 } else { 0 };

    TransformOutput { code, diagnostics, exit_status }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_round_trip_through_json() {
        let result = transform("~nonsense thing\n");
        let json = serde_json::to_string(&result).expect("serialize TransformOutput");
        let back: TransformOutput = serde_json::from_str(&json).expect("deserialize TransformOutput");
        assert_eq!(result, back);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let result = transform("");
        assert_eq!(result.code, "");
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn pure_host_file_passes_through_with_no_prologue() {
        let result = transform("x = 1\nprint(x)\n");
        assert_eq!(result.code, "x = 1\nprint(x)");
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn kinda_int_and_sorta_print_transform_together() {
        let result = transform("~kinda int x = 5\n~sorta print(x)\n");
        assert_eq!(result.code, "from kinda.runtime import kinda_int, sorta_print\nx = kinda_int(5)\nsorta_print(x)");
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn sometimes_block_transforms_with_brace_close() {
        let result = transform("~sometimes (True) {\n    print(\"hi\")\n}\n");
        assert_eq!(result.code, "from kinda.runtime import sometimes\nif sometimes(True):\n    print(\"hi\")");
    }

    #[test]
    fn maybe_for_loop_transforms_to_host_for_loop() {
        let result = transform("~maybe_for i in [1, 2, 3, 4, 5]:\n    print(i)\n");
        assert_eq!(
            result.code,
            "from kinda.runtime import maybe_for\nfor i in maybe_for([1, 2, 3, 4, 5]):\n    print(i)"
        );
    }

    #[test]
    fn ish_comparison_rewrites_inside_condition() {
        let result = transform("x = 5\ny = 5.05\nif x ~ish y:\n    print(\"close\")\n");
        assert_eq!(
            result.code,
            "from kinda.runtime import ish_comparison\nx = 5\ny = 5.05\nif ish_comparison(x, y):\n    print(\"close\")"
        );
    }

    #[test]
    fn welp_rewrites_to_fallback_call() {
        let result = transform("result = risky() ~welp 0\n");
        assert_eq!(result.code, "from kinda.runtime import welp\nresult = welp(lambda: risky(), 0)");
    }

    #[test]
    fn unclosed_brace_block_reports_diagnostic_and_nonzero_exit() {
        let result = transform("~sometimes (True) {\n    print(\"hi\")\n");
        assert_eq!(result.exit_status, 1);
        assert!(result.diagnostics.iter().any(|d| d.code == "E_BLOCK_UNCLOSED"));
    }

    #[test]
    fn unknown_construct_is_a_warning_and_passes_through() {
        let result = transform("~nonsense thing\n");
        assert_eq!(result.exit_status, 0);
        assert!(result.diagnostics.iter().any(|d| d.code == "W_UNKNOWN_CONSTRUCT"));
        assert!(result.code.ends_with("~nonsense thing"));
    }

    #[test]
    fn oversized_maybe_for_loop_variable_is_rejected() {
        let huge_name = "n".repeat(300);
        let source = format!("~maybe_for {huge_name} in [1, 2, 3]:\n    print({huge_name})\n");
        let result = transform(&source);
        assert_eq!(result.exit_status, 1);
        assert!(result.diagnostics.iter().any(|d| d.code == "E_UNSAFE_ARG"));
    }

    #[test]
    fn unsafe_argument_becomes_a_comment_with_error_diagnostic() {
        let result = transform("~kinda int x = __import__('os').system('ls')\n");
        assert_eq!(result.exit_status, 1);
        assert!(result.diagnostics.iter().any(|d| d.code == "E_UNSAFE_ARG"));
        assert!(result.code.contains("# ~kinda int x = __import__"));
    }

    #[test]
    fn dedent_closes_colon_blocks_without_an_explicit_marker() {
        let result = transform("~kinda_repeat(3):\n    print(\"x\")\nprint(\"after\")\n");
        assert_eq!(
            result.code,
            "from kinda.runtime import kinda_repeat_count\nfor _ in range(kinda_repeat_count(3)):\n    print(\"x\")\nprint(\"after\")"
        );
    }

    #[test]
    fn transforming_twice_is_idempotent_on_already_transformed_output() {
        let first = transform("~kinda int x = 5\n~sorta print(x)\n");
        let second = transform(&first.code);
        assert_eq!(first.code, second.code);
    }
}
