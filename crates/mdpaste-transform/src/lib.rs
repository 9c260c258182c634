//! Markdown to inline-styled HTML for paste targets.
//!
//! This crate converts author-written markdown into HTML whose styling
//! survives rich-text editors that strip stylesheets:
//! - `DocumentTransform` runs the fixed-order regex rewrite pipeline
//! - Diagram fences (mermaid or detected ASCII art) come out as
//!   `DiagramBlock`s with placeholder slots in the output
//! - `TransformResult` holds the segment arena and performs the final
//!   placeholder substitution once diagrams resolve
//! - Themes supply sanitized per-role inline style strings
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`theme`]: `ThemeId` and the per-role `StyleSheet` tables
//! - [`block`]: `DiagramBlock`, `DiagramKind`, the ASCII-art classifier
//! - [`extract`]: fenced/inline extraction into side tables
//! - [`rewrite`] and [`table`]: the ordered whole-text rewrites
//! - [`substitute`]: segment arena, pending placeholders, substitution
//! - [`transform`]: `DocumentTransform`, the pipeline entry point
//!
//! # Example
//!
//! ```ignore
//! use mdpaste_transform::{DocumentTransform, ThemeId};
//!
//! let transform = DocumentTransform::new(ThemeId::Antigravity);
//! let result = transform.transform("# Title\n\n```mermaid\nA-->B\n```");
//!
//! // Pending placeholders now; substitute once diagrams resolve.
//! let html = result.html();
//! let blocks = result.diagrams();
//! ```

mod block;
mod escape;
mod extract;
mod highlight;
mod rewrite;
mod slug;
mod substitute;
mod table;
mod theme;
mod transform;

pub use block::{DiagramBlock, DiagramKind, looks_like_ascii_art};
pub use escape::escape_html;
pub use highlight::{NullHighlighter, SyntaxHighlighter};
pub use slug::slugify;
pub use substitute::{Segment, TransformResult, error_box};
pub use theme::{StyleSheet, ThemeId, sanitize_style};
pub use transform::DocumentTransform;
