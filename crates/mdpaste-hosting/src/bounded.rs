//! Bounded-wait adapter around an [`ImageHost`].
//!
//! Every call is raced on a worker thread against a logical deadline.
//! The first settler wins; a worker finishing late finds the channel
//! closed and its result is dropped. The underlying request is not
//! aborted, only the wait for it.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::ImageHost;
use crate::error::HostError;

/// Default logical deadline for one hosting operation.
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(15_000);

fn run_with_deadline<T, F>(deadline: Duration, op: F) -> Result<T, HostError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, HostError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // Fails silently when the deadline side already gave up.
        let _ = tx.send(op());
    });

    match rx.recv_timeout(deadline) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!(?deadline, "hosting call exceeded deadline, abandoning wait");
            Err(HostError::Timeout(deadline))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(HostError::UnexpectedResponse {
            body: "hosting worker terminated before producing a result".to_string(),
        }),
    }
}

/// Deadline-enforcing wrapper for any [`ImageHost`].
///
/// Implements [`ImageHost`] itself, so it slots in wherever the bare host
/// would. The deadline applies per call, not per document.
pub struct BoundedHost {
    inner: Arc<dyn ImageHost>,
    deadline: Duration,
}

impl BoundedHost {
    #[must_use]
    pub fn new(inner: Arc<dyn ImageHost>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    #[must_use]
    pub fn with_default_deadline(inner: Arc<dyn ImageHost>) -> Self {
        Self::new(inner, DEFAULT_DEADLINE)
    }

    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

impl ImageHost for BoundedHost {
    fn upload_bytes(
        &self,
        bytes: &[u8],
        filename: &str,
        content_type: &str,
    ) -> Result<String, HostError> {
        let host = Arc::clone(&self.inner);
        let bytes = bytes.to_vec();
        let filename = filename.to_string();
        let content_type = content_type.to_string();
        run_with_deadline(self.deadline, move || {
            host.upload_bytes(&bytes, &filename, &content_type)
        })
    }

    fn fetch_and_upload(&self, image_url: &str) -> Result<String, HostError> {
        let host = Arc::clone(&self.inner);
        let url = image_url.to_string();
        run_with_deadline(self.deadline, move || host.fetch_and_upload(&url))
    }

    fn rehost_url(&self, image_url: &str) -> Result<String, HostError> {
        let host = Arc::clone(&self.inner);
        let url = image_url.to_string();
        run_with_deadline(self.deadline, move || host.rehost_url(&url))
    }

    fn fetch_data_uri(&self, url: &str) -> Result<String, HostError> {
        let host = Arc::clone(&self.inner);
        let url = url.to_string();
        run_with_deadline(self.deadline, move || host.fetch_data_uri(&url))
    }
}
