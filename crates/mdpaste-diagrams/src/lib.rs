//! Diagram encoding, hosting and fallback for mdpaste.
//!
//! This crate turns extracted diagram blocks into final image markup:
//! - Flowchart source preparation (auto-quoting, whitespace normalization)
//! - Payload encoding for mermaid.ink-compatible render URLs, with optional
//!   zlib compression
//! - Local SVG rendering for ASCII-art blocks
//! - `DiagramRenderer` orchestrating upload, fallback and error markup with
//!   a per-session URL cache
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`prepare`]: flowchart source normalization and auto-quoting
//! - [`encode`]: JSON envelope, compression and render-URL construction
//! - [`ascii`]: monospace SVG layout for ASCII art
//! - [`cache`]: session-scoped hash-to-URL cache
//! - [`render`]: the `DiagramRenderer` orchestrator and outcome types
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use mdpaste_diagrams::DiagramRenderer;
//! use mdpaste_hosting::{BoundedHost, DEFAULT_API_URL, DEFAULT_URL_PREFIX, HttpImageHost};
//! use mdpaste_transform::{DocumentTransform, ThemeId};
//!
//! let transform = DocumentTransform::new(ThemeId::Antigravity);
//! let result = transform.transform("```mermaid\ngraph TD\nA-->B\n```");
//!
//! let host = HttpImageHost::new(DEFAULT_API_URL, DEFAULT_URL_PREFIX, Duration::from_secs(30));
//! let renderer = DiagramRenderer::new(
//!     BoundedHost::new(Arc::new(host), Duration::from_secs(15)),
//!     ThemeId::Antigravity,
//! );
//! let rendered = renderer.render_all_parallel(result.diagrams());
//! ```

mod ascii;
mod cache;
mod encode;
mod prepare;
mod render;

pub use ascii::{ASCII_CONTENT_TYPE, ASCII_IMAGE_NAME, render_svg};
pub use cache::{CacheKey, SessionCache};
pub use encode::{
    Compressor, DisabledCompressor, EncodeError, EncodedPayload, ZlibCompressor, encode,
};
pub use prepare::prepare;
pub use render::{
    DEFAULT_IMAGE_TYPE, DEFAULT_MAX_URL_LEN, DEFAULT_SERVICE_URL, DiagramRenderer, RenderOutcome,
    RenderedDiagram, ResolveReport,
};
