//! Fixed-order markdown rewrites.
//!
//! Each pass is a whole-text regex substitution; the pipeline in
//! [`crate::transform`] fixes their order. This is deliberately not a
//! conforming CommonMark parser: the passes act on the syntax authors
//! actually paste, and inline HTML flows through untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::slug::slugify;
use crate::theme::StyleSheet;

static H4: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#### (.+)$").unwrap());
static H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.+)$").unwrap());
static H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.+)$").unwrap());
static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.+)$").unwrap());

static BOLD_ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*\*(.+?)\*\*\*").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static STRIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~(.+?)~~").unwrap());

static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Absolute URL whose only useful part is the trailing fragment.
static ABSOLUTE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^#]*(#.+)$").unwrap());

static BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^> (.+)$").unwrap());
static HORIZONTAL_RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^---$").unwrap());

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^(\s*)[-*] (.+)$").unwrap());
static ORDERED_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\d+\. (.+)$").unwrap());
static LIST_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(<li[^>]*>.*?</li>\n?)+").unwrap());

/// Raw fragment link inside a list item: `[Title](#slug)`.
static TOC_RAW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(#[^)]*\)").unwrap());
/// Already-rewritten fragment link inside a list item.
static TOC_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r##"<a href="#[^"]*"[^>]*>([^<]+)</a>"##).unwrap());

fn heading_pass(text: &str, re: &Regex, tag: &str, style: &str) -> String {
    re.replace_all(text, |caps: &Captures<'_>| {
        format!(
            r#"<{tag} id="{}" style="{style}">{}</{tag}>"#,
            slugify(&caps[1]),
            &caps[1]
        )
    })
    .into_owned()
}

/// Headings `#`..`####` with slugified anchor ids.
///
/// `h4` carries the paragraph style: the destination editor flattens deep
/// headings anyway, so it renders as emphasized body text.
pub(crate) fn rewrite_headings(text: &str, styles: &StyleSheet) -> String {
    let text = heading_pass(text, &H4, "h4", &styles.p);
    let text = heading_pass(&text, &H3, "h3", &styles.h3);
    let text = heading_pass(&text, &H2, "h2", &styles.h2);
    heading_pass(&text, &H1, "h1", &styles.h1)
}

/// Emphasis, longest marker first so `***` is not eaten by `**` or `*`.
pub(crate) fn rewrite_emphasis(text: &str, styles: &StyleSheet) -> String {
    let text = BOLD_ITALIC.replace_all(
        text,
        format!(
            r#"<strong style="{}"><em style="{}">$1</em></strong>"#,
            styles.strong, styles.em
        ),
    );
    let text = BOLD.replace_all(&text, format!(r#"<strong style="{}">$1</strong>"#, styles.strong));
    let text = ITALIC.replace_all(&text, format!(r#"<em style="{}">$1</em>"#, styles.em));
    STRIKE.replace_all(&text, "<s>$1</s>").into_owned()
}

/// `![alt](src)` to a centered image container.
pub(crate) fn rewrite_images(text: &str, styles: &StyleSheet) -> String {
    IMAGE
        .replace_all(
            text,
            format!(
                r#"<div style="{}"><img src="$2" alt="$1" style="max-width: 100%; border-radius: 8px; vertical-align: middle;"></div>"#,
                styles.img_container
            ),
        )
        .into_owned()
}

/// `[text](url)` links.
///
/// Fragment targets open in place; everything else opens in a new tab. An
/// absolute URL ending in a fragment is reduced to a same-document link,
/// since copy-pasted documents routinely carry their source site's base URL
/// in front of every TOC anchor.
pub(crate) fn rewrite_links(text: &str, styles: &StyleSheet) -> String {
    LINK.replace_all(text, |caps: &Captures<'_>| {
        let label = &caps[1];
        let url = &caps[2];

        if let Some(anchor) = ABSOLUTE_ANCHOR.captures(url) {
            return format!(
                r#"<a href="{}" style="{}" target="_self">{label}</a>"#,
                &anchor[1], styles.a
            );
        }
        if url.starts_with('#') {
            return format!(
                r#"<a href="{url}" style="{}" target="_self">{label}</a>"#,
                styles.a
            );
        }
        format!(
            r#"<a href="{url}" style="{}" target="_blank">{label}</a>"#,
            styles.a
        )
    })
    .into_owned()
}

pub(crate) fn rewrite_blockquotes(text: &str, styles: &StyleSheet) -> String {
    BLOCKQUOTE
        .replace_all(text, format!(r#"<blockquote style="{}">$1</blockquote>"#, styles.blockquote))
        .into_owned()
}

pub(crate) fn rewrite_rules(text: &str, styles: &StyleSheet) -> String {
    HORIZONTAL_RULE
        .replace_all(text, format!(r#"<hr style="{}">"#, styles.hr))
        .into_owned()
}

/// List items, with the TOC-cleanup rule, then `<ul>` wrapping.
///
/// An item whose content is a fragment link (raw or already rewritten) is
/// stripped to a plain `• text` bullet: destination filters mangle in-page
/// hyperlinks, and a dead link is worse than no link. Ordered items become
/// bare `<li>`s with no wrapper.
pub(crate) fn rewrite_lists(text: &str, styles: &StyleSheet) -> String {
    let text = LIST_ITEM.replace_all(text, |caps: &Captures<'_>| {
        let content = &caps[2];

        if let Some(toc) = TOC_RAW.captures(content) {
            return format!(r#"<li style="{}">• {}</li>"#, styles.li, &toc[1]);
        }
        if let Some(toc) = TOC_ANCHOR.captures(content) {
            return format!(r#"<li style="{}">• {}</li>"#, styles.li, &toc[1]);
        }
        format!(r#"<li style="{}">{content}</li>"#, styles.li)
    });

    let text = LIST_RUN.replace_all(
        &text,
        format!(
            r#"<ul style="{}; display: block; list-style-type: none; padding-left: 0; margin: 0.5em 0;">$0</ul>"#,
            styles.ul
        ),
    );

    ORDERED_ITEM
        .replace_all(&text, format!(r#"<li style="{}">$1</li>"#, styles.li))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeId;
    use pretty_assertions::assert_eq;

    fn styles() -> StyleSheet {
        StyleSheet::for_theme(ThemeId::Antigravity)
    }

    #[test]
    fn test_heading_levels_and_slugs() {
        let s = styles();
        let out = rewrite_headings("# Top\n## Section Two\n### Deep", &s);

        assert!(out.contains(r##"<h1 id="top""##));
        assert!(out.contains(r##"<h2 id="section-two""##));
        assert!(out.contains(r##"<h3 id="deep""##));
    }

    #[test]
    fn test_heading_korean_slug() {
        let out = rewrite_headings("# 섹션 1: 개요", &styles());
        assert!(out.contains(r##"id="섹션-1-개요""##), "got: {out}");
    }

    #[test]
    fn test_h4_uses_paragraph_style() {
        let s = styles();
        let out = rewrite_headings("#### Note", &s);
        assert!(out.contains(&format!(r#"<h4 id="note" style="{}">"#, s.p)));
    }

    #[test]
    fn test_emphasis_longest_first() {
        let s = styles();
        let out = rewrite_emphasis("***both*** **bold** *em* ~~gone~~", &s);

        assert!(out.contains("<strong") && out.contains("<em"));
        assert!(out.contains("<s>gone</s>"));
        // The *** form nests em inside strong.
        let both_pos = out.find("both").unwrap();
        let strong_pos = out.find("<strong").unwrap();
        let em_pos = out.find("<em").unwrap();
        assert!(strong_pos < em_pos && em_pos < both_pos);
    }

    #[test]
    fn test_image_wrapped_in_container() {
        let out = rewrite_images("![logo](https://x.test/logo.png)", &styles());
        assert!(out.starts_with("<div style="));
        assert!(out.contains(r#"<img src="https://x.test/logo.png" alt="logo""#));
    }

    #[test]
    fn test_external_link_new_tab() {
        let out = rewrite_links("[docs](https://example.com/docs)", &styles());
        assert!(out.contains(r#"href="https://example.com/docs""#));
        assert!(out.contains(r#"target="_blank""#));
    }

    #[test]
    fn test_fragment_link_same_tab() {
        let out = rewrite_links("[jump](#section)", &styles());
        assert!(out.contains(r##"href="#section""##));
        assert!(out.contains(r#"target="_self""#));
    }

    #[test]
    fn test_absolute_anchor_reduced_to_fragment() {
        let out = rewrite_links("[overview](https://notes.example/doc/abc#overview)", &styles());
        assert!(out.contains(r##"href="#overview""##), "got: {out}");
        assert!(!out.contains("notes.example"));
        assert!(out.contains(r#"target="_self""#));
    }

    #[test]
    fn test_blockquote_and_rule() {
        let s = styles();
        assert!(rewrite_blockquotes("> wisdom", &s).contains("<blockquote"));
        assert!(rewrite_rules("---", &s).contains("<hr"));
        // A rule with trailing text is left alone.
        assert_eq!(rewrite_rules("--- draft", &s), "--- draft");
    }

    #[test]
    fn test_list_items_wrapped() {
        let out = rewrite_lists("- one\n- two", &styles());
        assert!(out.starts_with("<ul style="));
        assert_eq!(out.matches("<li").count(), 2);
        assert_eq!(out.matches("</ul>").count(), 1);
    }

    #[test]
    fn test_toc_item_stripped_to_bullet() {
        let out = rewrite_lists("- [Intro](#intro)", &styles());
        assert!(out.contains("• Intro"));
        assert!(!out.contains("<a "));
    }

    #[test]
    fn test_rewritten_toc_item_stripped() {
        let s = styles();
        let pre_linked = format!(
            r##"- <a href="#intro" style="{}" target="_self">Intro</a>"##,
            s.a
        );
        let out = rewrite_lists(&pre_linked, &s);
        assert!(out.contains("• Intro"));
        assert!(!out.contains("<a "));
    }

    #[test]
    fn test_ordered_items_bare() {
        let out = rewrite_lists("1. first\n2. second", &styles());
        assert_eq!(out.matches("<li").count(), 2);
        assert!(!out.contains("<ol"));
    }
}
