//! Heading anchor slugs.

/// Slugify heading text into a stable anchor id.
///
/// Lowercases, turns whitespace runs into single dashes, drops everything
/// except alphanumerics (any script), dashes and underscores, then collapses
/// and trims dashes. Deterministic: the same text always yields the same slug.
///
/// # Examples
///
/// ```
/// use mdpaste_transform::slugify;
///
/// assert_eq!(slugify("Hello World!"), "hello-world");
/// assert_eq!(slugify("섹션 1: 개요"), "섹션-1-개요");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_dash = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() || ch == '-' {
            if !last_was_dash {
                out.push('-');
            }
            last_was_dash = true;
        } else if ch.is_alphanumeric() || ch == '_' {
            out.push(ch);
            last_was_dash = false;
        }
        // Everything else (punctuation, symbols) is dropped.
    }

    out.trim_matches('-').to_owned()
}
