//! The document transform pipeline.
//!
//! One synchronous pass: extract diagram and code content into side tables,
//! run the fixed-order markdown rewrites over what remains, wrap paragraphs,
//! restore code, then cut the buffer into segments around the diagram
//! tokens. Diagram resolution happens elsewhere; the result carries one
//! slot per extracted block for later substitution.

use std::sync::LazyLock;

use regex::Regex;

use crate::block::{DiagramBlock, DiagramKind};
use crate::escape::escape_html;
use crate::extract::{CodeBlock, extract};
use crate::highlight::{NullHighlighter, SyntaxHighlighter};
use crate::rewrite;
use crate::substitute::{Segment, TransformResult, pending_span};
use crate::table;
use crate::theme::{StyleSheet, ThemeId};

static EMPTY_PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<p[^>]*></p>").unwrap());
static EXCESS_BLANKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

const DIAGRAM_TOKEN_PREFIX: &str = "{{DIAGRAM_";

/// Markdown to inline-styled HTML converter for one theme.
///
/// Construction is cheap; the same instance can transform any number of
/// documents. A [`SyntaxHighlighter`] can be injected for fenced code
/// blocks; without one they are escaped to plain text.
pub struct DocumentTransform {
    theme: ThemeId,
    styles: StyleSheet,
    highlighter: Box<dyn SyntaxHighlighter>,
}

impl DocumentTransform {
    #[must_use]
    pub fn new(theme: ThemeId) -> Self {
        Self {
            theme,
            styles: StyleSheet::for_theme(theme),
            highlighter: Box::new(NullHighlighter),
        }
    }

    #[must_use]
    pub fn with_highlighter(mut self, highlighter: impl SyntaxHighlighter + 'static) -> Self {
        self.highlighter = Box::new(highlighter);
        self
    }

    #[must_use]
    pub fn theme(&self) -> ThemeId {
        self.theme
    }

    #[must_use]
    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Convert markdown into a [`TransformResult`].
    ///
    /// Deterministic and side-effect-free. Diagram and code fences are
    /// pulled out before any rewrite so their contents cannot be mangled
    /// by the markdown rules.
    #[must_use]
    pub fn transform(&self, markdown: &str) -> TransformResult {
        let normalized = markdown.replace("\r\n", "\n").replace('\r', "\n");
        let extraction = extract(&normalized);
        tracing::debug!(
            diagrams = extraction.diagrams.len(),
            code_blocks = extraction.code_blocks.len(),
            inline_code = extraction.inline_code.len(),
            "extracted fenced content"
        );

        let text = rewrite::rewrite_headings(&extraction.text, &self.styles);
        let text = rewrite::rewrite_emphasis(&text, &self.styles);
        let text = rewrite::rewrite_images(&text, &self.styles);
        let text = rewrite::rewrite_links(&text, &self.styles);
        let text = rewrite::rewrite_blockquotes(&text, &self.styles);
        let text = rewrite::rewrite_rules(&text, &self.styles);
        let (text, rows) = table::mark_rows(&text);
        let text = table::build_tables(&text, &rows, &self.styles);
        let text = rewrite::rewrite_lists(&text, &self.styles);

        let text = self.wrap_paragraphs(&text);
        let text = self.restore_inline_code(&text, &extraction.inline_code);
        let text = self.restore_code_blocks(&text, &extraction.code_blocks);

        let text = EMPTY_PARAGRAPH.replace_all(&text, "");
        let text = EXCESS_BLANKS.replace_all(&text, "\n\n");
        let wrapped = format!(
            r#"<div class="mdpaste-content" style="{}">{text}</div>"#,
            self.styles.container
        );

        self.segmentize(&wrapped, extraction.diagrams)
    }

    /// Wrap bare prose lines in `<p>` tags.
    ///
    /// Lines that are empty, already start a tag, or carry a placeholder
    /// token pass through unchanged.
    fn wrap_paragraphs(&self, text: &str) -> String {
        text.split('\n')
            .map(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty()
                    || trimmed.starts_with('<')
                    || trimmed.starts_with("{{")
                    || trimmed.ends_with("}}")
                {
                    line.to_string()
                } else {
                    format!(r#"<p style="{}">{trimmed}</p>"#, self.styles.p)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn restore_inline_code(&self, text: &str, spans: &[String]) -> String {
        let mut out = text.to_string();
        for (i, code) in spans.iter().enumerate() {
            out = out.replace(
                &format!("{{{{INLINE_{i}}}}}"),
                &format!(r#"<code style="{}">{}</code>"#, self.styles.code, escape_html(code)),
            );
        }
        out
    }

    /// Restore fenced code blocks, highlighted when the injected
    /// highlighter produces markup for the tag, escaped otherwise.
    fn restore_code_blocks(&self, text: &str, blocks: &[CodeBlock]) -> String {
        let mut out = text.to_string();
        for (i, block) in blocks.iter().enumerate() {
            let body = if block.lang.is_empty() {
                escape_html(&block.code)
            } else {
                self.highlighter
                    .highlight(&block.lang, &block.code)
                    .unwrap_or_else(|| escape_html(&block.code))
            };
            out = out.replace(
                &format!("{{{{CODE_{i}}}}}"),
                &format!(
                    r#"<pre style="{}"><code style="font-family: inherit;">{body}</code></pre>"#,
                    self.styles.pre
                ),
            );
        }
        out
    }

    /// Cut the final buffer into segments around the diagram tokens.
    ///
    /// Tokens with an index outside the block list stay literal, as does
    /// anything that merely resembles a token.
    fn segmentize(&self, text: &str, diagrams: Vec<DiagramBlock>) -> TransformResult {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut flowcharts_seen = 0usize;
        let mut ascii_seen = 0usize;
        let mut rest = text;

        while let Some(pos) = rest.find(DIAGRAM_TOKEN_PREFIX) {
            let after = &rest[pos + DIAGRAM_TOKEN_PREFIX.len()..];
            let Some(end) = after.find("}}") else {
                break;
            };
            match after[..end].parse::<usize>() {
                Ok(ix) if ix < diagrams.len() => {
                    current.push_str(&rest[..pos]);
                    if !current.is_empty() {
                        segments.push(Segment::Html(std::mem::take(&mut current)));
                    }
                    let block = &diagrams[ix];
                    let ordinal = match block.kind {
                        DiagramKind::Flowchart => {
                            flowcharts_seen += 1;
                            flowcharts_seen
                        }
                        DiagramKind::AsciiArt => {
                            ascii_seen += 1;
                            ascii_seen
                        }
                    };
                    segments.push(Segment::Slot {
                        diagram: ix,
                        pending: pending_span(block, ordinal, &self.styles.placeholder),
                    });
                    rest = &after[end + 2..];
                }
                _ => {
                    current.push_str(&rest[..pos + DIAGRAM_TOKEN_PREFIX.len()]);
                    rest = after;
                }
            }
        }
        current.push_str(rest);
        if !current.is_empty() {
            segments.push(Segment::Html(current));
        }

        TransformResult::new(segments, diagrams, self.styles.error_box.clone())
    }
}
