//! Local SVG rendering for ASCII-art blocks.
//!
//! ASCII art never goes to the render service; it is laid out locally as
//! monospace text on a themed background and uploaded as SVG. Width comes
//! from the longest line, height from the line count.

use mdpaste_transform::{ThemeId, escape_html};

const FONT_SIZE: f32 = 13.0;
const LINE_HEIGHT: f32 = 1.3;
const PADDING: f32 = 20.0;
/// Average monospace advance per character, in em.
const CHAR_WIDTH_EM: f32 = 0.6;

/// Filename used when uploading rendered ASCII art.
pub const ASCII_IMAGE_NAME: &str = "ascii.svg";

/// Content type of the rendered SVG.
pub const ASCII_CONTENT_TYPE: &str = "image/svg+xml";

fn colors(theme: ThemeId) -> (&'static str, &'static str) {
    match theme {
        ThemeId::Antigravity => ("#1e1e2e", "#cdd6f4"),
        ThemeId::Light => ("#ffffff", "#37352f"),
    }
}

/// Render ASCII-art source to an SVG document.
#[must_use]
pub fn render_svg(source: &str, theme: ThemeId) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let char_width = FONT_SIZE * CHAR_WIDTH_EM;
    let line_advance = FONT_SIZE * LINE_HEIGHT;
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let width = (longest as f32 * char_width + 2.0 * PADDING).ceil() as u32;
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let height = (lines.len() as f32 * line_advance + 2.0 * PADDING).ceil() as u32;

    let (background, foreground) = colors(theme);

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    svg.push_str(&format!(
        r#"<rect width="100%" height="100%" fill="{background}"/>"#
    ));

    for (i, line) in lines.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let baseline = PADDING + FONT_SIZE + i as f32 * line_advance;
        svg.push_str(&format!(
            r#"<text x="{PADDING}" y="{baseline}" font-family="monospace" font-size="{FONT_SIZE}" fill="{foreground}" xml:space="preserve">{}</text>"#,
            escape_html(line)
        ));
    }

    svg.push_str("</svg>");
    svg
}
