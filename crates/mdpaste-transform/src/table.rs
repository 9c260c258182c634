//! Pipe-table grouping.
//!
//! Two passes over the document. The first replaces every `|…|` line with a
//! numbered row token (cells parked in a side table) or a separator token.
//! The second collapses each token run into one `<table>` inside a
//! horizontal-scroll wrapper. Cells carry whatever inline markup earlier
//! passes produced; they are not re-escaped here.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::theme::StyleSheet;

static TABLE_ROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\|(.+)\|\s*$").unwrap());
static SEPARATOR_CELL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-+$").unwrap());
static TOKEN_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\{\{TROW_\d+\}\}\n?|\{\{TSEP\}\}\n?)+").unwrap());
static ROW_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{TROW_(\d+)\}\}").unwrap());

/// Replace table lines with tokens, collecting cell rows in document order.
///
/// A row whose cells are all dashes (`---`) is the header separator and
/// produces a separator token with no stored row. Alignment colons
/// (`:---`) are not recognized; such a row is ordinary data.
pub(crate) fn mark_rows(text: &str) -> (String, Vec<Vec<String>>) {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let out: Vec<String> = text
        .split('\n')
        .map(|line| {
            let Some(caps) = TABLE_ROW.captures(line) else {
                return line.to_string();
            };
            let cells: Vec<String> = caps[1].split('|').map(|c| c.trim().to_string()).collect();
            if cells.iter().all(|c| SEPARATOR_CELL.is_match(c)) {
                "{{TSEP}}".to_string()
            } else {
                let token = format!("{{{{TROW_{}}}}}", rows.len());
                rows.push(cells);
                token
            }
        })
        .collect();
    (out.join("\n"), rows)
}

/// Collapse each run of row/separator tokens into a styled table.
///
/// The first row of a run is the header iff the run contains a separator.
/// Even-indexed non-header rows take the zebra style. A run with no rows
/// (stray separator) is dropped.
pub(crate) fn build_tables(text: &str, rows: &[Vec<String>], styles: &StyleSheet) -> String {
    TOKEN_RUN
        .replace_all(text, |caps: &Captures<'_>| {
            let run = &caps[0];
            let has_separator = run.contains("{{TSEP}}");
            let indices: Vec<usize> = ROW_TOKEN
                .captures_iter(run)
                .filter_map(|c| c[1].parse().ok())
                .collect();
            if indices.is_empty() {
                return String::new();
            }

            let mut html = format!(
                r#"<div style="{}"><table style="{}">"#,
                styles.table_wrapper, styles.table
            );
            for (idx, &row_ix) in indices.iter().enumerate() {
                let Some(cells) = rows.get(row_ix) else {
                    continue;
                };
                let is_header = has_separator && idx == 0;
                if is_header {
                    html.push_str("<tr>");
                    for cell in cells {
                        html.push_str(&format!(r#"<th style="{}">{cell}</th>"#, styles.th));
                    }
                } else {
                    if idx % 2 == 0 {
                        html.push_str(&format!(r#"<tr style="{}">"#, styles.tr_even));
                    } else {
                        html.push_str("<tr>");
                    }
                    for cell in cells {
                        html.push_str(&format!(r#"<td style="{}">{cell}</td>"#, styles.td));
                    }
                }
                html.push_str("</tr>");
            }
            html.push_str("</table></div>\n");
            html
        })
        .into_owned()
}
