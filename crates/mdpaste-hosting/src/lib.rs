//! Image hosting for mdpaste diagram resolution.
//!
//! This crate turns rendered diagram images into durable hosted URLs:
//!
//! - [`ImageHost`] trait abstracting the hosting service
//! - [`HttpImageHost`] speaking the catbox-style form API over HTTP
//! - [`BoundedHost`] racing every call against a logical deadline
//! - Mock hosts for testing (behind the `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use mdpaste_hosting::{BoundedHost, HttpImageHost, ImageHost};
//!
//! let client = HttpImageHost::new(
//!     mdpaste_hosting::DEFAULT_API_URL,
//!     mdpaste_hosting::DEFAULT_URL_PREFIX,
//!     Duration::from_secs(30),
//! );
//! let host = BoundedHost::new(Arc::new(client), Duration::from_millis(15_000));
//! let url = host.fetch_and_upload("https://mermaid.ink/img/pako:...")?;
//! ```

mod bounded;
mod client;
mod error;
#[cfg(feature = "mock")]
mod mock;

pub use bounded::{BoundedHost, DEFAULT_DEADLINE};
pub use client::{DEFAULT_API_URL, DEFAULT_URL_PREFIX, HttpImageHost};
pub use error::HostError;
#[cfg(feature = "mock")]
pub use mock::{CountingHost, FailingHost, HangingHost};

/// A service that can host images at durable URLs.
///
/// Implementations must be shareable across threads; the deadline race in
/// [`BoundedHost`] moves calls onto worker threads.
pub trait ImageHost: Send + Sync {
    /// Upload raw image bytes; returns the hosted URL.
    fn upload_bytes(
        &self,
        bytes: &[u8],
        filename: &str,
        content_type: &str,
    ) -> Result<String, HostError>;

    /// Fetch a rendered image from `image_url` and upload its bytes.
    fn fetch_and_upload(&self, image_url: &str) -> Result<String, HostError>;

    /// Ask the hosting service to fetch `image_url` itself.
    ///
    /// Used when the source URL is too long to be worth round-tripping
    /// through this process.
    fn rehost_url(&self, image_url: &str) -> Result<String, HostError>;

    /// Fetch an image and return it as a `data:` URI.
    fn fetch_data_uri(&self, url: &str) -> Result<String, HostError>;
}
