//! Flowchart payload encoding.
//!
//! The render service takes the diagram as a base64 payload in the URL
//! path: a JSON envelope `{"code": …, "mermaid": {"theme": …}}`, deflated
//! and base64-url-encoded when compression is available, plain base64 of
//! the UTF-8 envelope otherwise. The two forms address different endpoint
//! variants and are not interchangeable.

use std::io::Write;

use base64::Engine;
use base64::prelude::{BASE64_STANDARD, BASE64_URL_SAFE};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use serde::Serialize;

use mdpaste_transform::ThemeId;

/// Compression capability, consulted on every encode call.
///
/// Availability is a runtime property, not configuration: an encoder is
/// asked each time and may decline by returning `None`, which degrades
/// the payload to the uncompressed form for that call only.
pub trait Compressor: Send + Sync {
    /// Compress `bytes`, or `None` when compression is unavailable.
    fn deflate(&self, bytes: &[u8]) -> Option<Vec<u8>>;
}

/// zlib-wrapped deflate at best compression.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZlibCompressor;

impl Compressor for ZlibCompressor {
    fn deflate(&self, bytes: &[u8]) -> Option<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(bytes).ok()?;
        encoder.finish().ok()
    }
}

/// Compressor that always declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCompressor;

impl Compressor for DisabledCompressor {
    fn deflate(&self, _bytes: &[u8]) -> Option<Vec<u8>> {
        None
    }
}

/// Error from payload encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// JSON serialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

/// URL-safe encoded diagram payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    /// Base64 payload data.
    pub data: String,
    /// Whether the compressor produced output on this call.
    pub compressed: bool,
}

impl EncodedPayload {
    /// Render-service URL for this payload.
    ///
    /// Compressed payloads address the `pako:` endpoint variant, raw
    /// payloads the plain one.
    #[must_use]
    pub fn render_url(&self, service_url: &str, image_type: &str) -> String {
        let base = service_url.trim_end_matches('/');
        if self.compressed {
            format!("{base}/img/pako:{}?type={image_type}", self.data)
        } else {
            format!("{base}/img/{}?type={image_type}", self.data)
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    code: &'a str,
    mermaid: MermaidOptions<'a>,
}

#[derive(Serialize)]
struct MermaidOptions<'a> {
    theme: &'a str,
}

/// Encode prepared flowchart source into a URL-safe payload.
pub fn encode(
    source: &str,
    theme: ThemeId,
    compressor: &dyn Compressor,
) -> Result<EncodedPayload, EncodeError> {
    let envelope = serde_json::to_string(&Envelope {
        code: source,
        mermaid: MermaidOptions {
            theme: theme.flowchart_theme(),
        },
    })?;

    match compressor.deflate(envelope.as_bytes()) {
        Some(compressed) => {
            tracing::debug!(
                raw = envelope.len(),
                compressed = compressed.len(),
                "encoded diagram payload"
            );
            Ok(EncodedPayload {
                data: BASE64_URL_SAFE.encode(&compressed),
                compressed: true,
            })
        }
        None => Ok(EncodedPayload {
            data: BASE64_STANDARD.encode(envelope.as_bytes()),
            compressed: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use pretty_assertions::assert_eq;
    use std::io::Read;

    #[test]
    fn test_uncompressed_payload_is_plain_envelope() {
        let payload = encode("A-->B", ThemeId::Antigravity, &DisabledCompressor).unwrap();

        assert!(!payload.compressed);
        let decoded = BASE64_STANDARD.decode(&payload.data).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            r#"{"code":"A-->B","mermaid":{"theme":"dark"}}"#
        );
    }

    #[test]
    fn test_compressed_payload_round_trips() {
        let payload = encode("graph TD\nA-->B", ThemeId::Antigravity, &ZlibCompressor).unwrap();

        assert!(payload.compressed);
        let bytes = BASE64_URL_SAFE.decode(&payload.data).unwrap();
        let mut decoder = ZlibDecoder::new(&bytes[..]);
        let mut envelope = String::new();
        decoder.read_to_string(&mut envelope).unwrap();
        assert_eq!(
            envelope,
            r#"{"code":"graph TD\nA-->B","mermaid":{"theme":"dark"}}"#
        );
    }

    #[test]
    fn test_compressed_data_is_url_safe() {
        let source = "graph TD\n".repeat(40);
        let payload = encode(&source, ThemeId::Antigravity, &ZlibCompressor).unwrap();

        assert!(
            payload
                .data
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=')),
            "unexpected character in {}",
            payload.data
        );
    }

    #[test]
    fn test_light_theme_maps_to_default() {
        let payload = encode("A-->B", ThemeId::Light, &DisabledCompressor).unwrap();
        let decoded = BASE64_STANDARD.decode(&payload.data).unwrap();
        assert!(String::from_utf8(decoded).unwrap().contains(r#""theme":"default""#));
    }

    #[test]
    fn test_render_url_variants() {
        let compressed = EncodedPayload {
            data: "abc".to_string(),
            compressed: true,
        };
        let raw = EncodedPayload {
            data: "abc".to_string(),
            compressed: false,
        };

        assert_eq!(
            compressed.render_url("https://mermaid.ink/", "png"),
            "https://mermaid.ink/img/pako:abc?type=png"
        );
        assert_eq!(
            raw.render_url("https://mermaid.ink", "svg"),
            "https://mermaid.ink/img/abc?type=svg"
        );
    }
}
