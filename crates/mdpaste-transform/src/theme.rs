//! Theme palettes and inline style tables.
//!
//! Destination editors strip `<style>` blocks and class attributes, so every
//! element carries its full style inline. [`StyleSheet`] maps semantic roles
//! to CSS declaration strings; all values are sanitized at construction so
//! they can be embedded in double-quoted `style="…"` attributes.

/// Visual theme for converted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeId {
    /// Dark theme tuned for the destination editor (default).
    #[default]
    Antigravity,
    /// Plain light theme.
    Light,
}

impl ThemeId {
    /// Parse a theme name (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "antigravity" => Some(Self::Antigravity),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Canonical theme name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Antigravity => "antigravity",
            Self::Light => "light",
        }
    }

    /// Theme name understood by the remote flowchart renderer.
    #[must_use]
    pub fn flowchart_theme(self) -> &'static str {
        match self {
            Self::Antigravity => "dark",
            Self::Light => "default",
        }
    }
}

/// Color palette backing a [`StyleSheet`].
#[derive(Debug, Clone, Copy)]
struct Palette {
    bg: &'static str,
    text: &'static str,
    border: &'static str,
    code_bg: &'static str,
    accent: &'static str,
    table_header: &'static str,
    table_border: &'static str,
    error: &'static str,
}

const ANTIGRAVITY: Palette = Palette {
    bg: "#191919",
    text: "#D4D4D4",
    border: "#2F2F2F",
    code_bg: "#272727",
    accent: "#2EAADC",
    table_header: "#252525",
    table_border: "#373737",
    error: "#FC8181",
};

const LIGHT: Palette = Palette {
    bg: "#FFFFFF",
    text: "#37352F",
    border: "#E9E9E7",
    code_bg: "#F7F7F5",
    accent: "#0B6E99",
    table_header: "#F7F7F5",
    table_border: "#E9E9E7",
    error: "#D32F2F",
};

/// Font stacks use single quotes only; these strings end up inside
/// double-quoted HTML attributes.
const FONT_STACK: &str =
    "'Pretendard Variable', Pretendard, -apple-system, BlinkMacSystemFont, sans-serif";
const MONO_STACK: &str = "'JetBrains Mono', monospace";

/// Sanitize a CSS declaration string for embedding in a `style` attribute.
///
/// Collapses newlines and whitespace runs to single spaces, replaces double
/// quotes with single quotes, and trims.
#[must_use]
pub fn sanitize_style(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_was_space = false;
    for ch in value.chars() {
        let ch = if ch == '"' { '\'' } else { ch };
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim().to_owned()
}

/// Inline style table for one theme.
///
/// Each field is a complete CSS declaration list for one semantic role.
#[derive(Debug, Clone)]
pub struct StyleSheet {
    pub container: String,
    pub h1: String,
    pub h2: String,
    pub h3: String,
    pub p: String,
    pub strong: String,
    pub em: String,
    pub a: String,
    pub hr: String,
    pub blockquote: String,
    pub code: String,
    pub pre: String,
    pub table: String,
    pub th: String,
    pub td: String,
    pub tr_even: String,
    pub table_wrapper: String,
    pub ul: String,
    pub li: String,
    pub img_container: String,
    pub placeholder: String,
    pub error_box: String,
}

impl StyleSheet {
    /// Build the style table for a theme.
    #[must_use]
    pub fn for_theme(theme: ThemeId) -> Self {
        let p = match theme {
            ThemeId::Antigravity => ANTIGRAVITY,
            ThemeId::Light => LIGHT,
        };

        let raw = Self {
            container: format!(
                "font-family: {FONT_STACK}; line-height: 1.6; color: {}; \
                 background-color: {} !important; box-sizing: border-box; width: 100%; \
                 max-width: 720px; margin: 0; padding: 24px 16px; border-radius: 0; \
                 font-size: 16px; word-break: keep-all; overflow-wrap: break-word; \
                 text-align: left; -webkit-font-smoothing: antialiased; \
                 letter-spacing: -0.003em;",
                p.text, p.bg
            ),
            h1: format!(
                "font-size: 1.8em; font-weight: 700; margin: 2em 0 0.6em; padding-top: 0.5em; \
                 color: {}; border-bottom: none; line-height: 1.3; letter-spacing: -0.02em; \
                 text-align: left;",
                p.text
            ),
            h2: format!(
                "font-size: 1.5em; font-weight: 600; margin: 1.8em 0 0.4em; padding-top: 0.3em; \
                 color: {}; border-bottom: 1px solid {}; padding-bottom: 6px; text-align: left;",
                p.text, p.border
            ),
            h3: format!(
                "font-size: 1.3em; font-weight: 600; margin: 1.4em 0 0.3em; color: {}; \
                 text-align: left;",
                p.text
            ),
            p: "margin: 0.5em 0; line-height: 1.6; min-height: 1em; text-align: left;".to_owned(),
            strong: format!("font-weight: 600; color: {};", p.text),
            em: "font-style: italic; opacity: 0.85;".to_owned(),
            a: format!(
                "color: {}; text-decoration: underline; text-decoration-color: {}; \
                 text-underline-offset: 3px; opacity: 0.9;",
                p.text, p.accent
            ),
            hr: format!("border: none; border-bottom: 1px solid {}; margin: 32px 0;", p.border),
            blockquote: format!(
                "border-left: 3px solid {}; padding: 4px 14px; margin: 12px 0; color: {}; \
                 background: transparent; font-style: normal; opacity: 0.85; text-align: left;",
                p.text, p.text
            ),
            code: format!(
                "font-family: {MONO_STACK}; background: {}; padding: 2px 5px; \
                 border-radius: 3px; font-size: 85%; color: {};",
                p.code_bg, p.error
            ),
            pre: format!(
                "font-family: {MONO_STACK}; background: {}; padding: 16px; border-radius: 4px; \
                 overflow-x: auto; margin: 16px 0; font-size: 14px; line-height: 1.5; \
                 color: {}; white-space: pre !important; word-break: normal !important; \
                 tab-size: 4; -webkit-overflow-scrolling: touch; text-align: left;",
                p.code_bg, p.text
            ),
            table: format!(
                "border-collapse: collapse; width: auto; max-width: 100%; font-size: 14px; \
                 border: 1px solid {}; border-radius: 0; margin: 0;",
                p.table_border
            ),
            th: format!(
                "background-color: {}; font-weight: 600; text-align: left; padding: 10px 12px; \
                 border: 1px solid {}; color: {};",
                p.table_header, p.table_border, p.text
            ),
            td: format!(
                "padding: 8px 12px; border: 1px solid {}; color: {};",
                p.table_border, p.text
            ),
            tr_even: "background-color: transparent;".to_owned(),
            table_wrapper: "overflow-x: auto; margin: 24px 0; border: none; border-radius: 3px; \
                 -webkit-overflow-scrolling: touch;"
                .to_owned(),
            ul: "margin: 0.5em 0; padding-left: 0; list-style-type: disc; \
                 list-style-position: inside; text-align: left;"
                .to_owned(),
            li: "margin: 0.2em 0; padding-left: 0; text-align: left;".to_owned(),
            img_container: "margin: 24px 0; padding: 0; display: block; \
                 text-align: center !important; width: 100%;"
                .to_owned(),
            placeholder: "display: block; padding: 20px; text-align: center; \
                 background: rgba(128,128,128,0.1); border: 1px dashed #666; margin: 10px 0; \
                 color: #888;"
                .to_owned(),
            error_box: format!(
                "color: {}; border: 1px solid {}; padding: 10px; border-radius: 4px; \
                 margin: 12px 0;",
                p.error, p.error
            ),
        };

        raw.sanitized()
    }

    /// Apply [`sanitize_style`] to every value.
    fn sanitized(self) -> Self {
        Self {
            container: sanitize_style(&self.container),
            h1: sanitize_style(&self.h1),
            h2: sanitize_style(&self.h2),
            h3: sanitize_style(&self.h3),
            p: sanitize_style(&self.p),
            strong: sanitize_style(&self.strong),
            em: sanitize_style(&self.em),
            a: sanitize_style(&self.a),
            hr: sanitize_style(&self.hr),
            blockquote: sanitize_style(&self.blockquote),
            code: sanitize_style(&self.code),
            pre: sanitize_style(&self.pre),
            table: sanitize_style(&self.table),
            th: sanitize_style(&self.th),
            td: sanitize_style(&self.td),
            tr_even: sanitize_style(&self.tr_even),
            table_wrapper: sanitize_style(&self.table_wrapper),
            ul: sanitize_style(&self.ul),
            li: sanitize_style(&self.li),
            img_container: sanitize_style(&self.img_container),
            placeholder: sanitize_style(&self.placeholder),
            error_box: sanitize_style(&self.error_box),
        }
    }

    /// All role values, for validation.
    fn values(&self) -> [&str; 22] {
        [
            &self.container,
            &self.h1,
            &self.h2,
            &self.h3,
            &self.p,
            &self.strong,
            &self.em,
            &self.a,
            &self.hr,
            &self.blockquote,
            &self.code,
            &self.pre,
            &self.table,
            &self.th,
            &self.td,
            &self.tr_even,
            &self.table_wrapper,
            &self.ul,
            &self.li,
            &self.img_container,
            &self.placeholder,
            &self.error_box,
        ]
    }
}
