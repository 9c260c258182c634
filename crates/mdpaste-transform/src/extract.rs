//! Fenced-block and inline-code extraction.
//!
//! Runs before any rewrite pass so code never meets the markdown regexes.
//! Extracted content moves to side tables and leaves a numbered token
//! (`{{DIAGRAM_n}}`, `{{CODE_n}}`, `{{INLINE_n}}`) in the text; tokens are
//! resolved again at the end of the pipeline.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::block::{DiagramBlock, DiagramKind, looks_like_ascii_art};

static FLOWCHART_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```mermaid\s*?\n(.*?)```").unwrap());

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(\w*)\n(.*?)```").unwrap());

static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// A fenced code block kept verbatim until restoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CodeBlock {
    pub(crate) lang: String,
    pub(crate) code: String,
}

/// Extraction output: tokenized text plus side tables.
#[derive(Debug)]
pub(crate) struct Extraction {
    pub(crate) text: String,
    pub(crate) diagrams: Vec<DiagramBlock>,
    pub(crate) code_blocks: Vec<CodeBlock>,
    pub(crate) inline_code: Vec<String>,
}

/// Extract diagram fences, code fences and inline code from `markdown`.
///
/// `markdown` must already be newline-normalized. Diagram tokens index into
/// the returned `diagrams` vec; the extraction order (flowcharts first, then
/// auto-classified ASCII art) fixes block ids for the whole conversion.
pub(crate) fn extract(markdown: &str) -> Extraction {
    let mut diagrams: Vec<DiagramBlock> = Vec::new();
    let mut code_blocks: Vec<CodeBlock> = Vec::new();
    let mut inline_code: Vec<String> = Vec::new();

    // Flowchart fences first: a ```mermaid tag always wins over the ASCII
    // classifier.
    let text = FLOWCHART_FENCE.replace_all(markdown, |caps: &Captures<'_>| {
        let seq = diagrams.len();
        diagrams.push(DiagramBlock::new(
            seq,
            DiagramKind::Flowchart,
            caps[1].trim(),
        ));
        format!("{{{{DIAGRAM_{seq}}}}}")
    });

    // Remaining fences: divert ASCII art, keep the rest as code blocks.
    let text = CODE_FENCE.replace_all(&text, |caps: &Captures<'_>| {
        let lang = &caps[1];
        let code = &caps[2];

        if looks_like_ascii_art(lang, code) {
            let seq = diagrams.len();
            diagrams.push(DiagramBlock::new(seq, DiagramKind::AsciiArt, code.trim_end()));
            return format!("{{{{DIAGRAM_{seq}}}}}");
        }

        let index = code_blocks.len();
        code_blocks.push(CodeBlock {
            lang: lang.to_owned(),
            code: code.to_owned(),
        });
        format!("{{{{CODE_{index}}}}}")
    });

    let text = INLINE_CODE.replace_all(&text, |caps: &Captures<'_>| {
        let index = inline_code.len();
        inline_code.push(caps[1].to_owned());
        format!("{{{{INLINE_{index}}}}}")
    });

    Extraction {
        text: text.into_owned(),
        diagrams,
        code_blocks,
        inline_code,
    }
}
