//! Mock image hosts for testing.
//!
//! Provides deterministic [`ImageHost`] implementations for unit testing
//! without network access.

use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crate::ImageHost;
use crate::error::HostError;

/// Always-succeeding host that counts calls per method.
///
/// # Example
///
/// ```ignore
/// use mdpaste_hosting::{CountingHost, ImageHost};
///
/// let host = CountingHost::new("https://files.example/img.png");
/// host.fetch_and_upload("https://render.example/x").unwrap();
/// assert_eq!(host.fetch_and_upload_calls(), 1);
/// ```
#[derive(Debug)]
pub struct CountingHost {
    hosted_url: String,
    data_uri: String,
    upload_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    rehost_calls: AtomicUsize,
    data_uri_calls: AtomicUsize,
    filenames: RwLock<Vec<String>>,
}

impl CountingHost {
    /// Create a host that answers every upload with `hosted_url`.
    #[must_use]
    pub fn new(hosted_url: impl Into<String>) -> Self {
        Self {
            hosted_url: hosted_url.into(),
            data_uri: "data:image/png;base64,AA==".to_string(),
            upload_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            rehost_calls: AtomicUsize::new(0),
            data_uri_calls: AtomicUsize::new(0),
            filenames: RwLock::new(Vec::new()),
        }
    }

    /// Override the data URI returned by `fetch_data_uri`.
    #[must_use]
    pub fn with_data_uri(mut self, data_uri: impl Into<String>) -> Self {
        self.data_uri = data_uri.into();
        self
    }

    #[must_use]
    pub fn upload_bytes_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn fetch_and_upload_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn rehost_url_calls(&self) -> usize {
        self.rehost_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn fetch_data_uri_calls(&self) -> usize {
        self.data_uri_calls.load(Ordering::SeqCst)
    }

    /// Filenames seen by `upload_bytes`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn uploaded_filenames(&self) -> Vec<String> {
        self.filenames.read().unwrap().clone()
    }
}

impl ImageHost for CountingHost {
    fn upload_bytes(
        &self,
        _bytes: &[u8],
        filename: &str,
        _content_type: &str,
    ) -> Result<String, HostError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.filenames.write().unwrap().push(filename.to_string());
        Ok(self.hosted_url.clone())
    }

    fn fetch_and_upload(&self, _image_url: &str) -> Result<String, HostError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hosted_url.clone())
    }

    fn rehost_url(&self, _image_url: &str) -> Result<String, HostError> {
        self.rehost_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hosted_url.clone())
    }

    fn fetch_data_uri(&self, _url: &str) -> Result<String, HostError> {
        self.data_uri_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.data_uri.clone())
    }
}

/// Host whose every call fails with an HTTP status error.
#[derive(Debug)]
pub struct FailingHost {
    status: u16,
    body: String,
}

impl FailingHost {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    fn err(&self) -> HostError {
        HostError::Status {
            status: self.status,
            body: self.body.clone(),
        }
    }
}

impl ImageHost for FailingHost {
    fn upload_bytes(&self, _: &[u8], _: &str, _: &str) -> Result<String, HostError> {
        Err(self.err())
    }

    fn fetch_and_upload(&self, _: &str) -> Result<String, HostError> {
        Err(self.err())
    }

    fn rehost_url(&self, _: &str) -> Result<String, HostError> {
        Err(self.err())
    }

    fn fetch_data_uri(&self, _: &str) -> Result<String, HostError> {
        Err(self.err())
    }
}

/// Host that never settles.
///
/// Each call blocks its thread indefinitely; only useful behind a
/// [`BoundedHost`](crate::BoundedHost), which abandons the wait at its
/// deadline and leaves the blocked worker thread to die with the process.
#[derive(Debug)]
pub struct HangingHost;

impl HangingHost {
    fn block_forever() -> ! {
        loop {
            thread::sleep(Duration::from_secs(60));
        }
    }
}

impl ImageHost for HangingHost {
    fn upload_bytes(&self, _: &[u8], _: &str, _: &str) -> Result<String, HostError> {
        Self::block_forever()
    }

    fn fetch_and_upload(&self, _: &str) -> Result<String, HostError> {
        Self::block_forever()
    }

    fn rehost_url(&self, _: &str) -> Result<String, HostError> {
        Self::block_forever()
    }

    fn fetch_data_uri(&self, _: &str) -> Result<String, HostError> {
        Self::block_forever()
    }
}
