//! Diagram block types and the ASCII-art classifier.

use std::sync::LazyLock;

use regex::Regex;

/// Box-drawing glyphs (┌ ─ │ ┘ …).
static BOX_DRAWING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{2500}-\u{257F}]").unwrap());

/// Classic ASCII boxes: `+----+` borders or `| cell |` walls.
static CLASSIC_BOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\+[-=]{2,}\+)|(\|[\s0-9A-Za-z_]+\|)").unwrap());

/// Arrow runs: `-->`, `==>`, `<--`.
static ARROWS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-=]{2,}>|<[-=]{2,}").unwrap());

/// What kind of diagram a block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    /// Flowchart syntax rendered by a remote service.
    Flowchart,
    /// Monospace ASCII art rendered locally.
    AsciiArt,
}

impl DiagramKind {
    /// Stable name used in cache keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::AsciiArt => "ascii",
        }
    }

    /// Human-facing label for placeholders and alt text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Flowchart => "Diagram",
            Self::AsciiArt => "ASCII Art",
        }
    }
}

/// One extracted diagram, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Placeholder element id, unique within one conversion.
    pub id: String,
    /// Diagram kind.
    pub kind: DiagramKind,
    /// Trimmed, newline-normalized source.
    pub source: String,
}

impl DiagramBlock {
    /// Create a block with a sequence-derived id.
    #[must_use]
    pub fn new(seq: usize, kind: DiagramKind, source: impl Into<String>) -> Self {
        Self {
            id: format!("dgm-{seq}"),
            kind,
            source: source.into(),
        }
    }
}

/// Decide whether an untagged (or `text`/`txt`/`ascii`) fenced block is ASCII art.
///
/// Requires a multi-line body plus at least one visual signal: box-drawing
/// glyphs, classic `+--+` / `| x |` boxes, arrow runs, or the explicit
/// `ascii` tag. Single-line blocks always stay code. Diagram-looking plain
/// text will be misclassified; that is the accepted cost of auto-detection.
#[must_use]
pub fn looks_like_ascii_art(lang: &str, source: &str) -> bool {
    let lang = lang.to_ascii_lowercase();
    if !(lang.is_empty() || lang == "text" || lang == "txt" || lang == "ascii") {
        return false;
    }

    let multiline = source.contains('\n');
    multiline
        && (BOX_DRAWING.is_match(source)
            || CLASSIC_BOX.is_match(source)
            || ARROWS.is_match(source)
            || lang == "ascii")
}
