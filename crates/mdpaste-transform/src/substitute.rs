//! Transform output and diagram-slot substitution.
//!
//! The transformed document is held as a segment arena: literal HTML runs
//! interleaved with one slot per extracted diagram. [`TransformResult::html`]
//! renders slots as visible pending placeholders; [`TransformResult::substitute`]
//! fills them with rendered markup. A slot whose outcome is missing gets an
//! error box, so no placeholder can survive substitution.

use std::collections::HashMap;

use crate::block::{DiagramBlock, DiagramKind};
use crate::escape::escape_html;

/// One piece of the transformed document.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Literal HTML, emitted verbatim.
    Html(String),
    /// Placeholder for the diagram at `diagram` in the block list.
    Slot {
        diagram: usize,
        /// Pre-rendered pending element shown before resolution.
        pending: String,
    },
}

/// Result of one document transform.
#[derive(Debug, Clone)]
pub struct TransformResult {
    segments: Vec<Segment>,
    diagrams: Vec<DiagramBlock>,
    error_box_style: String,
}

impl TransformResult {
    pub(crate) fn new(
        segments: Vec<Segment>,
        diagrams: Vec<DiagramBlock>,
        error_box_style: String,
    ) -> Self {
        Self {
            segments,
            diagrams,
            error_box_style,
        }
    }

    /// Diagram blocks in document order, ids unique within this result.
    #[must_use]
    pub fn diagrams(&self) -> &[DiagramBlock] {
        &self.diagrams
    }

    /// Document HTML with every diagram slot shown as a pending placeholder.
    #[must_use]
    pub fn html(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Html(text) => out.push_str(text),
                Segment::Slot { pending, .. } => out.push_str(pending),
            }
        }
        out
    }

    /// Document HTML with every slot replaced by its rendered markup.
    ///
    /// `outcomes` maps diagram id to final markup. A missing id is replaced
    /// by an error box rather than left as a placeholder.
    #[must_use]
    pub fn substitute(&self, outcomes: &HashMap<String, String>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Html(text) => out.push_str(text),
                Segment::Slot { diagram, .. } => {
                    let block = &self.diagrams[*diagram];
                    match outcomes.get(&block.id) {
                        Some(markup) => out.push_str(markup),
                        None => {
                            tracing::warn!(id = %block.id, "no render result for diagram slot");
                            out.push_str(&error_box(
                                block.kind.label(),
                                "no render result",
                                &self.error_box_style,
                            ));
                        }
                    }
                }
            }
        }
        out
    }
}

/// Pending placeholder element for an unresolved diagram.
///
/// `ordinal` counts per kind, 1-based, matching the progress wording users
/// see while a document resolves.
pub(crate) fn pending_span(block: &DiagramBlock, ordinal: usize, style: &str) -> String {
    let verb = match block.kind {
        DiagramKind::Flowchart => "Uploading",
        DiagramKind::AsciiArt => "Processing",
    };
    format!(
        r#"<span id="{}" class="mdpaste-{}-placeholder" style="{style}">⏳ {} {ordinal} {verb}...</span>"#,
        block.id,
        block.kind.as_str(),
        block.kind.label(),
    )
}

/// Themed error box with a bold label line and an escaped message.
#[must_use]
pub fn error_box(label: &str, message: &str, style: &str) -> String {
    format!(
        r#"<div style="{style}"><strong>[{label} Error]</strong><br/>{}</div>"#,
        escape_html(message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(seq: usize, kind: DiagramKind) -> DiagramBlock {
        DiagramBlock::new(seq, kind, "A-->B")
    }

    fn sample() -> TransformResult {
        let d0 = block(0, DiagramKind::Flowchart);
        let pending = pending_span(&d0, 1, "color: #888");
        TransformResult::new(
            vec![
                Segment::Html("<p>before</p>".into()),
                Segment::Slot {
                    diagram: 0,
                    pending,
                },
                Segment::Html("<p>after</p>".into()),
            ],
            vec![d0],
            "border: 1px solid red".into(),
        )
    }

    #[test]
    fn test_html_shows_pending_placeholder() {
        let out = sample().html();

        assert!(out.contains("<p>before</p>"));
        assert!(out.contains(r##"<span id="dgm-0""##));
        assert!(out.contains("⏳ Diagram 1 Uploading..."));
        assert!(out.contains("<p>after</p>"));
    }

    #[test]
    fn test_substitute_fills_slot_in_place() {
        let result = sample();
        let mut outcomes = HashMap::new();
        outcomes.insert("dgm-0".to_string(), "<img src='x'>".to_string());

        let out = result.substitute(&outcomes);

        assert_eq!(out, "<p>before</p><img src='x'><p>after</p>");
        assert!(!out.contains('⏳'));
    }

    #[test]
    fn test_missing_outcome_becomes_error_box() {
        let out = sample().substitute(&HashMap::new());

        assert!(out.contains("[Diagram Error]"));
        assert!(out.contains("no render result"));
        assert!(!out.contains("<span id="));
        assert!(!out.contains('⏳'));
    }

    #[test]
    fn test_ascii_pending_wording() {
        let d = block(3, DiagramKind::AsciiArt);
        let span = pending_span(&d, 2, "color: #888");

        assert!(span.contains(r##"id="dgm-3""##));
        assert!(span.contains("mdpaste-ascii-placeholder"));
        assert!(span.contains("⏳ ASCII Art 2 Processing..."));
    }

    #[test]
    fn test_error_box_escapes_message() {
        let out = error_box("Diagram", "<script>alert(1)</script>", "color: red");

        assert!(out.contains("&lt;script&gt;"));
        assert!(!out.contains("<script>"));
        assert!(out.starts_with(r#"<div style="color: red">"#));
    }
}
