//! Syntax highlighting capability.

/// Optional highlighter consulted when fenced code blocks are restored.
///
/// `None` (unknown language, unavailable backend, highlight failure) makes
/// the caller fall back to escaped plain text. Highlighting can never fail a
/// conversion.
pub trait SyntaxHighlighter: Send + Sync {
    /// Highlight `code` as `lang`, returning inline-markup HTML.
    ///
    /// The returned markup is embedded verbatim inside `<pre><code>`, so
    /// implementations are responsible for escaping.
    fn highlight(&self, lang: &str, code: &str) -> Option<String>;
}

/// Highlighter that is never available; code blocks stay escaped plain text.
pub struct NullHighlighter;

impl SyntaxHighlighter for NullHighlighter {
    fn highlight(&self, _lang: &str, _code: &str) -> Option<String> {
        None
    }
}
