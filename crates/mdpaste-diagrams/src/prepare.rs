//! Flowchart source normalization.
//!
//! The rendering grammar parses unquoted non-Latin text badly in label
//! positions, so spans containing non-ASCII letters are wrapped in quotes
//! before encoding. This is a best-effort textual patch over known label
//! positions, not a re-parse; ASCII-only sources pass through unchanged.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Edge labels: `-->|text|`.
static EDGE_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-->\|([^|]+)\|").unwrap());
/// Remaining arrow-with-label forms: `-.->|text|`, `==>|text|` and friends.
static ARROW_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-[-.>]+)\|([^|]+)\|").unwrap());
/// `par` / `subgraph` heading labels.
static SCOPE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^(\s*)(par|subgraph)\s+([^"\n][^\n]*?)$"#).unwrap());
/// Bracket node labels: `[text]`.
static BRACKET_NODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\[([^\]"]+)\]"#).unwrap());
/// Brace branch labels: `{text}`.
static BRACE_NODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\{([^}"]+)\}"#).unwrap());
/// Sequence-diagram messages: `A->>B: text`.
static SEQUENCE_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(->>|-->>|->|-->|--\)|--x)\s*([^:\n]+):\s*([^\n]+)$").unwrap()
});

static LEADING_INDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]+").unwrap());
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

fn has_non_ascii_letter(text: &str) -> bool {
    text.chars().any(|c| !c.is_ascii() && c.is_alphabetic())
}

fn auto_quote(code: &str) -> String {
    let result = EDGE_LABEL.replace_all(code, |caps: &Captures<'_>| {
        let label = &caps[1];
        if has_non_ascii_letter(label) && !label.starts_with('"') {
            format!(r#"-->|"{}"|"#, label.trim())
        } else {
            caps[0].to_string()
        }
    });

    let result = ARROW_LABEL.replace_all(&result, |caps: &Captures<'_>| {
        let label = &caps[2];
        if has_non_ascii_letter(label) && !label.starts_with('"') {
            format!(r#"{}|"{}"|"#, &caps[1], label.trim())
        } else {
            caps[0].to_string()
        }
    });

    let result = SCOPE_LABEL.replace_all(&result, |caps: &Captures<'_>| {
        let label = &caps[3];
        if has_non_ascii_letter(label) && !label.starts_with('"') {
            format!(r#"{}{} "{}""#, &caps[1], &caps[2], label.trim())
        } else {
            caps[0].to_string()
        }
    });

    let result = BRACKET_NODE.replace_all(&result, |caps: &Captures<'_>| {
        let content = &caps[1];
        if has_non_ascii_letter(content) {
            format!(r#"["{content}"]"#)
        } else {
            caps[0].to_string()
        }
    });

    let result = BRACE_NODE.replace_all(&result, |caps: &Captures<'_>| {
        let content = &caps[1];
        if has_non_ascii_letter(content) {
            format!(r#"{{"{content}"}}"#)
        } else {
            caps[0].to_string()
        }
    });

    SEQUENCE_MESSAGE
        .replace_all(&result, |caps: &Captures<'_>| {
            let message = &caps[3];
            if has_non_ascii_letter(message) && !message.trim().starts_with('"') {
                format!(r#"{}{}: "{}""#, &caps[1], &caps[2], message.trim())
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Normalize flowchart source for hashing and encoding.
///
/// Trims, auto-quotes ambiguous non-ASCII labels, strips per-line leading
/// indentation, and removes blank lines. Deterministic, so the result is
/// a stable cache-key input.
#[must_use]
pub fn prepare(source: &str) -> String {
    let quoted = auto_quote(source.trim());
    let stripped = LEADING_INDENT.replace_all(&quoted, "");
    BLANK_RUNS.replace_all(&stripped, "\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ascii_labels_untouched() {
        let src = "graph TD\nA-->|yes|B\nA[start]-->C{choice}";
        assert_eq!(auto_quote(src), src);
    }

    #[test]
    fn test_edge_label_quoted() {
        assert_eq!(auto_quote("A-->|예|B"), r#"A-->|"예"|B"#);
    }

    #[test]
    fn test_dotted_arrow_label_quoted() {
        assert_eq!(auto_quote("A-.->|아니오|B"), r#"A-.->|"아니오"|B"#);
    }

    #[test]
    fn test_already_quoted_label_untouched() {
        let src = r#"A-->|"예"|B"#;
        assert_eq!(auto_quote(src), src);
    }

    #[test]
    fn test_bracket_and_brace_nodes_quoted() {
        assert_eq!(auto_quote("A[시작]"), r#"A["시작"]"#);
        assert_eq!(auto_quote("B{분기}"), r#"B{"분기"}"#);
    }

    #[test]
    fn test_subgraph_label_quoted() {
        assert_eq!(auto_quote("subgraph 영역 이름"), r#"subgraph "영역 이름""#);
    }

    #[test]
    fn test_sequence_message_quoted() {
        assert_eq!(auto_quote("A->>B: 안녕하세요"), r#"A->>B: "안녕하세요""#);
    }

    #[test]
    fn test_non_ascii_symbols_not_quoted() {
        // Only letters trigger quoting; arrows and punctuation do not.
        let src = "A-->|→|B";
        assert_eq!(auto_quote(src), src);
    }

    #[test]
    fn test_prepare_strips_indent_and_blanks() {
        let out = prepare("  graph TD\n\n\n  A-->B\n");
        assert_eq!(out, "graph TD\nA-->B");
    }

    #[test]
    fn test_prepare_deterministic() {
        let src = "  graph TD\n  A[시작]-->B\n";
        assert_eq!(prepare(src), prepare(src));
    }
}
