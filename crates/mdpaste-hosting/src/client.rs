//! HTTP client for the image hosting service.

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use rand::RngExt;
use tracing::{debug, info};

use crate::ImageHost;
use crate::error::HostError;

/// Default hosting API endpoint.
pub const DEFAULT_API_URL: &str = "https://catbox.moe/user/api.php";

/// Prefix a successful upload response must start with.
pub const DEFAULT_URL_PREFIX: &str = "https://files.catbox.moe/";

/// Image host speaking the catbox-style form API.
///
/// Uploads are multipart `fileupload` requests; rehosting is a form
/// `urlupload`. The service answers with the hosted URL as plain text,
/// which is validated against [`url_prefix`](Self::new) before being
/// returned.
pub struct HttpImageHost {
    agent: ureq::Agent,
    api_url: String,
    url_prefix: String,
}

impl HttpImageHost {
    /// Create a client with a per-request timeout on the agent.
    ///
    /// The agent timeout is a transport-level backstop; callers wanting the
    /// logical deadline race should wrap this in a
    /// [`BoundedHost`](crate::BoundedHost).
    #[must_use]
    pub fn new(
        api_url: impl Into<String>,
        url_prefix: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_url: api_url.into(),
            url_prefix: url_prefix.into(),
        }
    }

    fn fetch_image(&self, url: &str) -> Result<(Vec<u8>, String), HostError> {
        debug!(url, "fetching image");
        let response = self.agent.get(url).call()?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("Content-Type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_string());
            return Err(HostError::Status {
                status,
                body: error_body,
            });
        }

        Ok((body_reader.read_to_vec()?, content_type))
    }

    fn read_hosted_url(
        &self,
        response: ureq::http::Response<ureq::Body>,
    ) -> Result<String, HostError> {
        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_string());
            return Err(HostError::Status {
                status,
                body: error_body,
            });
        }

        validate_hosted_body(&body_reader.read_to_string()?, &self.url_prefix)
    }
}

impl ImageHost for HttpImageHost {
    fn upload_bytes(
        &self,
        bytes: &[u8],
        filename: &str,
        content_type: &str,
    ) -> Result<String, HostError> {
        info!(filename, bytes = bytes.len(), "uploading image");

        let boundary = format!("----MdpasteFormBoundary{:016x}", rand::rng().random::<u64>());
        let body = multipart_upload_body(&boundary, filename, content_type, bytes);

        let response = self
            .agent
            .post(&self.api_url)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .send(&body[..])?;

        self.read_hosted_url(response)
    }

    fn fetch_and_upload(&self, image_url: &str) -> Result<String, HostError> {
        let (bytes, content_type) = self.fetch_image(image_url)?;
        self.upload_bytes(&bytes, "diagram.png", &content_type)
    }

    fn rehost_url(&self, image_url: &str) -> Result<String, HostError> {
        info!(url = image_url, "rehosting image server-side");

        let response = self
            .agent
            .post(&self.api_url)
            .send_form([("reqtype", "urlupload"), ("url", image_url)])?;

        self.read_hosted_url(response)
    }

    fn fetch_data_uri(&self, url: &str) -> Result<String, HostError> {
        let (bytes, content_type) = self.fetch_image(url)?;
        Ok(data_uri(&content_type, &bytes))
    }
}

/// Multipart body for a catbox `fileupload` request.
fn multipart_upload_body(
    boundary: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> Vec<u8> {
    let mut body = Vec::new();

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"reqtype\"\r\n\r\n");
    body.extend_from_slice(b"fileupload\r\n");

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"fileToUpload\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

/// Validate a plain-text success body against the expected URL prefix.
fn validate_hosted_body(body: &str, url_prefix: &str) -> Result<String, HostError> {
    let url = body.trim();
    if url.starts_with(url_prefix) {
        Ok(url.to_string())
    } else {
        Err(HostError::UnexpectedResponse {
            body: body.to_string(),
        })
    }
}

/// Encode bytes as a `data:` URI.
fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", BASE64_STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_multipart_body_layout() {
        let body = multipart_upload_body("----B0", "pic.png", "image/png", b"\x89PNG");
        let text = String::from_utf8_lossy(&body);

        assert!(text.starts_with("------B0\r\n"));
        assert!(text.contains("name=\"reqtype\"\r\n\r\nfileupload\r\n"));
        assert!(text.contains("name=\"fileToUpload\"; filename=\"pic.png\""));
        assert!(text.contains("Content-Type: image/png\r\n\r\n"));
        assert!(text.ends_with("------B0--\r\n"));
    }

    #[test]
    fn test_validate_accepts_prefixed_url() {
        let url = validate_hosted_body(
            "https://files.catbox.moe/abc123.png\n",
            "https://files.catbox.moe/",
        )
        .unwrap();
        assert_eq!(url, "https://files.catbox.moe/abc123.png");
    }

    #[test]
    fn test_validate_rejects_error_text() {
        let err = validate_hosted_body("No files given.", "https://files.catbox.moe/");
        match err {
            Err(HostError::UnexpectedResponse { body }) => assert_eq!(body, "No files given."),
            other => panic!("expected UnexpectedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_data_uri_format() {
        let uri = data_uri("image/svg+xml", b"<svg/>");
        assert_eq!(uri, "data:image/svg+xml;base64,PHN2Zy8+");
    }
}
