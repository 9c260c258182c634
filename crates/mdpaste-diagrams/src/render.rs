//! Diagram rendering orchestration.
//!
//! Drives each extracted block through encode, upload and fallback and
//! produces final markup. Every block ends in exactly one terminal outcome;
//! failures become fallback images or error boxes, never errors returned to
//! the caller.

use std::time::Duration;

use mdpaste_hosting::{BoundedHost, ImageHost};
use mdpaste_transform::{DiagramBlock, DiagramKind, StyleSheet, ThemeId, error_box};
use rayon::prelude::*;

use crate::ascii;
use crate::cache::{CacheKey, SessionCache};
use crate::encode::{Compressor, DisabledCompressor, ZlibCompressor, encode};
use crate::prepare::prepare;

/// Default mermaid.ink-compatible render service.
pub const DEFAULT_SERVICE_URL: &str = "https://mermaid.ink";

/// Default image type requested from the render service.
pub const DEFAULT_IMAGE_TYPE: &str = "png";

/// Render URLs longer than this are handed to the hosting service to fetch
/// server-side instead of being downloaded by this process.
pub const DEFAULT_MAX_URL_LEN: usize = 2000;

const HOSTED_IMG_STYLE: &str =
    "width: 100%; max-width: 100%; display: block; border-radius: 4px; margin: 12px 0;";

const FALLBACK_IMG_STYLE: &str = "width: 100%; max-width: 100%; display: block; margin: 12px 0;";

/// Hides the broken image and appends a visible notice when the direct
/// render URL does not load in the destination editor.
const FALLBACK_ONERROR: &str = r#"this.style.display='none'; this.parentNode.insertAdjacentHTML('beforeend', '<br><span style=\'color:red\'>Mermaid Render Failed</span>')"#;

/// Terminal result of rendering one diagram block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Image uploaded to the hosting service.
    Hosted { url: String },
    /// Upload failed; the markup points straight at the render service.
    FallbackDirect { url: String },
    /// No image could be produced at all.
    Failed { message: String },
}

/// A rendered block ready for placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    pub id: String,
    pub outcome: RenderOutcome,
    pub html: String,
}

/// Counts of terminal outcomes across one conversion, for display.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolveReport {
    pub hosted: usize,
    pub fallback: usize,
    pub failed: usize,
}

impl ResolveReport {
    #[must_use]
    pub fn tally(rendered: &[RenderedDiagram]) -> Self {
        let mut report = Self::default();
        for diagram in rendered {
            match diagram.outcome {
                RenderOutcome::Hosted { .. } => report.hosted += 1,
                RenderOutcome::FallbackDirect { .. } => report.fallback += 1,
                RenderOutcome::Failed { .. } => report.failed += 1,
            }
        }
        report
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.hosted + self.fallback + self.failed
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Renders diagram blocks to hosted images with fallbacks.
///
/// Holds a session cache, so rendering the same source twice within one
/// renderer reuses the first hosted URL without touching the network.
pub struct DiagramRenderer {
    host: BoundedHost,
    cache: SessionCache,
    theme: ThemeId,
    styles: StyleSheet,
    service_url: String,
    image_type: String,
    max_url_len: usize,
    embed_images: bool,
    compressor: Box<dyn Compressor>,
}

impl DiagramRenderer {
    #[must_use]
    pub fn new(host: BoundedHost, theme: ThemeId) -> Self {
        Self {
            host,
            cache: SessionCache::new(),
            theme,
            styles: StyleSheet::for_theme(theme),
            service_url: DEFAULT_SERVICE_URL.to_string(),
            image_type: DEFAULT_IMAGE_TYPE.to_string(),
            max_url_len: DEFAULT_MAX_URL_LEN,
            embed_images: false,
            compressor: Box::new(ZlibCompressor),
        }
    }

    /// Set the render service base URL.
    #[must_use]
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    /// Set the image type requested from the render service.
    #[must_use]
    pub fn with_image_type(mut self, image_type: impl Into<String>) -> Self {
        self.image_type = image_type.into();
        self
    }

    /// Set the render-URL length above which rehosting is used.
    #[must_use]
    pub fn with_max_url_len(mut self, max_url_len: usize) -> Self {
        self.max_url_len = max_url_len;
        self
    }

    /// Enable or disable payload compression for flowchart URLs.
    #[must_use]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compressor = if enabled {
            Box::new(ZlibCompressor)
        } else {
            Box::new(DisabledCompressor)
        };
        self
    }

    /// Emit `data:` URIs instead of remote URLs in the final markup.
    #[must_use]
    pub fn with_embedded_images(mut self, embed: bool) -> Self {
        self.embed_images = embed;
        self
    }

    /// Deadline applied to each hosting call.
    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.host.deadline()
    }

    /// Render one block to its terminal outcome and markup.
    #[must_use]
    pub fn render_one(&self, block: &DiagramBlock) -> RenderedDiagram {
        let key = CacheKey {
            kind: block.kind,
            source: &block.source,
        };
        if let Some(url) = self.cache.get(&key) {
            tracing::debug!(id = %block.id, "Session cache hit");
            return self.finish(block, RenderOutcome::Hosted { url });
        }

        let outcome = match block.kind {
            DiagramKind::Flowchart => self.render_flowchart(block, &key),
            DiagramKind::AsciiArt => self.render_ascii(block, &key),
        };
        self.finish(block, outcome)
    }

    /// Render all blocks sequentially.
    #[must_use]
    pub fn render_all(&self, blocks: &[DiagramBlock]) -> Vec<RenderedDiagram> {
        blocks.iter().map(|block| self.render_one(block)).collect()
    }

    /// Render all blocks in parallel on the global rayon pool.
    ///
    /// The session cache is shared, so duplicate blocks may race; the first
    /// finished upload wins and later ones adopt its URL.
    #[must_use]
    pub fn render_all_parallel(&self, blocks: &[DiagramBlock]) -> Vec<RenderedDiagram> {
        if blocks.is_empty() {
            return Vec::new();
        }
        blocks
            .par_iter()
            .map(|block| self.render_one(block))
            .collect()
    }

    fn render_flowchart(&self, block: &DiagramBlock, key: &CacheKey) -> RenderOutcome {
        let prepared = prepare(&block.source);
        let payload = match encode(&prepared, self.theme, self.compressor.as_ref()) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(id = %block.id, error = %e, "Diagram encoding failed");
                return RenderOutcome::Failed {
                    message: e.to_string(),
                };
            }
        };
        let render_url = payload.render_url(&self.service_url, &self.image_type);

        let hosted = if render_url.len() > self.max_url_len {
            tracing::debug!(
                id = %block.id,
                url_len = render_url.len(),
                "Render URL over limit, rehosting server-side"
            );
            self.host.rehost_url(&render_url)
        } else {
            self.host.fetch_and_upload(&render_url)
        };

        match hosted {
            Ok(url) => RenderOutcome::Hosted {
                url: self.cache.insert(key, url),
            },
            Err(e) => {
                tracing::warn!(id = %block.id, error = %e, "Upload failed, using direct render URL");
                RenderOutcome::FallbackDirect { url: render_url }
            }
        }
    }

    fn render_ascii(&self, block: &DiagramBlock, key: &CacheKey) -> RenderOutcome {
        let svg = ascii::render_svg(&block.source, self.theme);
        match self.host.upload_bytes(
            svg.as_bytes(),
            ascii::ASCII_IMAGE_NAME,
            ascii::ASCII_CONTENT_TYPE,
        ) {
            Ok(url) => RenderOutcome::Hosted {
                url: self.cache.insert(key, url),
            },
            Err(e) => {
                tracing::warn!(id = %block.id, error = %e, "ASCII art upload failed");
                RenderOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    fn finish(&self, block: &DiagramBlock, outcome: RenderOutcome) -> RenderedDiagram {
        let html = self.markup(block, &outcome);
        RenderedDiagram {
            id: block.id.clone(),
            outcome,
            html,
        }
    }

    /// Final markup for an outcome.
    ///
    /// Hosted and fallback images are bare `<img>` tags. Destination editors
    /// are known to drop or mangle images inside wrapper elements.
    fn markup(&self, block: &DiagramBlock, outcome: &RenderOutcome) -> String {
        match outcome {
            RenderOutcome::Hosted { url } => {
                let src = self.image_src(url);
                let alt = match block.kind {
                    DiagramKind::Flowchart => "Mermaid Diagram",
                    DiagramKind::AsciiArt => "ASCII Art",
                };
                format!(r#"<img src="{src}" alt="{alt}" style="{HOSTED_IMG_STYLE}">"#)
            }
            RenderOutcome::FallbackDirect { url } => {
                let src = self.image_src(url);
                format!(
                    r#"<img src="{src}" alt="Mermaid Diagram (Fallback)" style="{FALLBACK_IMG_STYLE}" onerror="{FALLBACK_ONERROR}">"#
                )
            }
            RenderOutcome::Failed { message } => {
                error_box(block.kind.label(), message, &self.styles.error_box)
            }
        }
    }

    /// The `src` attribute for an image URL, embedding it when requested.
    fn image_src(&self, url: &str) -> String {
        if !self.embed_images {
            return url.to_string();
        }
        match self.host.fetch_data_uri(url) {
            Ok(data_uri) => data_uri,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Embedding failed, keeping remote URL");
                url.to_string()
            }
        }
    }
}

impl std::fmt::Debug for DiagramRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramRenderer")
            .field("theme", &self.theme)
            .field("service_url", &self.service_url)
            .field("image_type", &self.image_type)
            .field("max_url_len", &self.max_url_len)
            .field("embed_images", &self.embed_images)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use mdpaste_hosting::{CountingHost, FailingHost, HangingHost};
    use pretty_assertions::assert_eq;

    use super::*;

    const HOSTED: &str = "https://files.example/abc123.png";

    fn block(id_seq: usize, kind: DiagramKind, source: &str) -> DiagramBlock {
        DiagramBlock::new(id_seq, kind, source.to_string())
    }

    fn renderer_with<H: ImageHost + 'static>(host: Arc<H>) -> DiagramRenderer {
        DiagramRenderer::new(
            BoundedHost::new(host, Duration::from_secs(5)),
            ThemeId::Antigravity,
        )
    }

    #[test]
    fn test_cache_prevents_duplicate_uploads() {
        let counting = Arc::new(CountingHost::new(HOSTED));
        let renderer = renderer_with(Arc::clone(&counting));

        let first = block(1, DiagramKind::Flowchart, "graph TD\nA-->B");
        let second = block(2, DiagramKind::Flowchart, "graph TD\nA-->B");

        let rendered = renderer.render_all(&[first, second]);

        assert_eq!(counting.fetch_and_upload_calls(), 1);
        assert_eq!(
            rendered[0].outcome,
            RenderOutcome::Hosted {
                url: HOSTED.to_string()
            }
        );
        assert_eq!(rendered[0].outcome, rendered[1].outcome);
    }

    #[test]
    fn test_distinct_sources_upload_separately() {
        let counting = Arc::new(CountingHost::new(HOSTED));
        let renderer = renderer_with(Arc::clone(&counting));

        let first = renderer.render_one(&block(1, DiagramKind::Flowchart, "graph TD\nA-->B"));
        let second = renderer.render_one(&block(2, DiagramKind::Flowchart, "graph TD\nB-->C"));

        assert_eq!(counting.fetch_and_upload_calls(), 2);
        assert!(matches!(first.outcome, RenderOutcome::Hosted { .. }));
        assert!(matches!(second.outcome, RenderOutcome::Hosted { .. }));
    }

    #[test]
    fn test_rehost_selected_for_long_urls() {
        let counting = Arc::new(CountingHost::new(HOSTED));
        let renderer = renderer_with(Arc::clone(&counting)).with_max_url_len(50);

        let outcome = renderer
            .render_one(&block(1, DiagramKind::Flowchart, "graph TD\nA-->B"))
            .outcome;

        assert_eq!(counting.rehost_url_calls(), 1);
        assert_eq!(counting.fetch_and_upload_calls(), 0);
        assert_eq!(
            outcome,
            RenderOutcome::Hosted {
                url: HOSTED.to_string()
            }
        );
    }

    #[test]
    fn test_upload_failure_falls_back_to_direct_url() {
        let renderer = renderer_with(Arc::new(FailingHost::new(500, "Internal Server Error")));

        let rendered = renderer.render_one(&block(1, DiagramKind::Flowchart, "graph TD\nA-->B"));

        let RenderOutcome::FallbackDirect { url } = &rendered.outcome else {
            panic!("expected fallback, got {:?}", rendered.outcome);
        };
        assert!(url.starts_with("https://mermaid.ink/img/pako:"));
        assert!(rendered.html.contains("Mermaid Diagram (Fallback)"));
        assert!(rendered.html.contains("onerror="));
        assert!(rendered.html.contains("Mermaid Render Failed"));
    }

    #[test]
    fn test_hanging_host_resolves_within_deadline() {
        let renderer = DiagramRenderer::new(
            BoundedHost::new(Arc::new(HangingHost), Duration::from_millis(50)),
            ThemeId::Antigravity,
        );

        let start = Instant::now();
        let rendered = renderer.render_one(&block(1, DiagramKind::Flowchart, "graph TD\nA-->B"));
        let elapsed = start.elapsed();

        assert!(matches!(
            rendered.outcome,
            RenderOutcome::FallbackDirect { .. }
        ));
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    }

    #[test]
    fn test_ascii_uploads_svg() {
        let counting = Arc::new(CountingHost::new("https://files.example/art.svg"));
        let renderer = renderer_with(Arc::clone(&counting));

        let rendered = renderer.render_one(&block(1, DiagramKind::AsciiArt, "+--+\n|  |\n+--+"));

        assert_eq!(counting.upload_bytes_calls(), 1);
        assert_eq!(counting.uploaded_filenames(), vec!["ascii.svg".to_string()]);
        assert_eq!(
            rendered.outcome,
            RenderOutcome::Hosted {
                url: "https://files.example/art.svg".to_string()
            }
        );
        assert!(rendered.html.contains(r#"alt="ASCII Art""#));
    }

    #[test]
    fn test_ascii_failure_is_terminal() {
        let renderer = renderer_with(Arc::new(FailingHost::new(412, "over quota")));

        let rendered = renderer.render_one(&block(1, DiagramKind::AsciiArt, "+--+"));

        assert!(matches!(rendered.outcome, RenderOutcome::Failed { .. }));
        assert!(rendered.html.contains("[ASCII Art Error]"));
        assert!(rendered.html.contains("over quota"));
    }

    #[test]
    fn test_hosted_markup_is_a_bare_img() {
        let renderer = renderer_with(Arc::new(CountingHost::new(HOSTED)));

        let rendered = renderer.render_one(&block(1, DiagramKind::Flowchart, "graph TD\nA-->B"));

        assert!(rendered.html.starts_with("<img "));
        assert!(!rendered.html.contains("<div"));
        assert!(rendered.html.contains("border-radius: 4px"));
    }

    #[test]
    fn test_embed_mode_inlines_data_uri() {
        let counting = Arc::new(
            CountingHost::new(HOSTED).with_data_uri("data:image/png;base64,iVBORw0KGgo="),
        );
        let renderer = renderer_with(Arc::clone(&counting)).with_embedded_images(true);

        let rendered = renderer.render_one(&block(1, DiagramKind::Flowchart, "graph TD\nA-->B"));

        assert_eq!(counting.fetch_data_uri_calls(), 1);
        assert!(
            rendered
                .html
                .contains(r#"src="data:image/png;base64,iVBORw0KGgo=""#)
        );
        // The outcome keeps the remote URL; only the markup embeds.
        assert_eq!(
            rendered.outcome,
            RenderOutcome::Hosted {
                url: HOSTED.to_string()
            }
        );
    }

    #[test]
    fn test_embed_failure_keeps_remote_url() {
        let renderer =
            renderer_with(Arc::new(FailingHost::new(500, "down"))).with_embedded_images(true);

        let rendered = renderer.render_one(&block(1, DiagramKind::Flowchart, "graph TD\nA-->B"));

        let RenderOutcome::FallbackDirect { url } = &rendered.outcome else {
            panic!("expected fallback, got {:?}", rendered.outcome);
        };
        assert!(rendered.html.contains(&format!(r#"src="{url}""#)));
        assert!(!rendered.html.contains("data:image"));
    }

    #[test]
    fn test_parallel_render_shares_cache() {
        let counting = Arc::new(CountingHost::new(HOSTED));
        let renderer = renderer_with(Arc::clone(&counting));

        let blocks: Vec<DiagramBlock> = (1..=4)
            .map(|n| block(n, DiagramKind::Flowchart, "graph TD\nA-->B"))
            .collect();
        let rendered = renderer.render_all_parallel(&blocks);

        assert_eq!(rendered.len(), 4);
        // Concurrent misses may each upload, but all adopt one cached URL.
        assert!(counting.fetch_and_upload_calls() >= 1);
        for diagram in &rendered {
            assert_eq!(
                diagram.outcome,
                RenderOutcome::Hosted {
                    url: HOSTED.to_string()
                }
            );
        }
    }

    #[test]
    fn test_report_tallies_outcomes() {
        let rendered = vec![
            RenderedDiagram {
                id: "dgm-1".to_string(),
                outcome: RenderOutcome::Hosted {
                    url: HOSTED.to_string(),
                },
                html: String::new(),
            },
            RenderedDiagram {
                id: "dgm-2".to_string(),
                outcome: RenderOutcome::FallbackDirect {
                    url: "https://mermaid.ink/img/x?type=png".to_string(),
                },
                html: String::new(),
            },
            RenderedDiagram {
                id: "dgm-3".to_string(),
                outcome: RenderOutcome::Failed {
                    message: "boom".to_string(),
                },
                html: String::new(),
            },
        ];

        let report = ResolveReport::tally(&rendered);
        assert_eq!(report.hosted, 1);
        assert_eq!(report.fallback, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.total(), 3);
        assert!(report.has_failures());
    }
}
