//! Mock PDF backend for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use snapcite_core::{BackendError, PdfBackend, PdfDocument};

/// A hand-rolled [`PdfBackend`] that ignores its input and returns a fixed
/// document (or a fixed open error).
///
/// Records how often it was called and how many bytes it last saw, so tests
/// can check that fetched bodies actually reach the backend.
pub struct MockBackend {
    response: Result<PdfDocument, String>,
    call_count: AtomicUsize,
    last_input_len: AtomicUsize,
}

impl MockBackend {
    /// Create a mock that always parses to `document`.
    pub fn new(document: PdfDocument) -> Self {
        Self {
            response: Ok(document),
            call_count: AtomicUsize::new(0),
            last_input_len: AtomicUsize::new(0),
        }
    }

    /// Create a mock that always fails to open the document.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            call_count: AtomicUsize::new(0),
            last_input_len: AtomicUsize::new(0),
        }
    }

    /// How many times `parse()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Length of the byte slice handed to the most recent `parse()`.
    pub fn last_input_len(&self) -> usize {
        self.last_input_len.load(Ordering::SeqCst)
    }
}

impl PdfBackend for MockBackend {
    fn parse(&self, bytes: &[u8]) -> Result<PdfDocument, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.last_input_len.store(bytes.len(), Ordering::SeqCst);

        match &self.response {
            Ok(document) => Ok(document.clone()),
            Err(msg) => Err(BackendError::OpenError(msg.clone())),
        }
    }
}
