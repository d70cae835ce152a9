use mupdf::document::MetadataName;
use mupdf::{Document, TextPageFlags};

use snapcite_core::{BackendError, PdfBackend, PdfDocument, PdfInfo};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that non-PDF code paths do not transitively
/// depend on it.
///
/// Only page one is decoded. Text in the top `header_exclusion_ratio` of the
/// page is dropped so running heads ("Preprint. Under review.") do not win
/// the title heuristic.
pub struct MupdfBackend {
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    /// Default 0.03. `None` disables header exclusion.
    header_exclusion_ratio: Option<f32>,
}

impl Default for MupdfBackend {
    fn default() -> Self {
        Self {
            header_exclusion_ratio: Some(0.03),
        }
    }
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    fn first_page_lines(&self, document: &Document) -> Result<Vec<String>, BackendError> {
        let page_count = document
            .page_count()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        if page_count == 0 {
            return Ok(Vec::new());
        }

        let page = document
            .load_page(0)
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let page_bounds = page
            .bounds()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        let header_threshold = self
            .header_exclusion_ratio
            .map(|r| page_bounds.y0 + (page_bounds.y1 - page_bounds.y0) * r);

        let mut lines = Vec::new();
        for block in text_page.blocks() {
            if let Some(threshold) = header_threshold
                && block.bounds().y1 <= threshold
            {
                continue;
            }

            for line in block.lines() {
                let text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                let text = text.trim();
                if !text.is_empty() {
                    lines.push(text.to_string());
                }
            }
        }
        Ok(lines)
    }
}

/// Metadata lookups that fail or come back blank count as absent.
fn metadata(document: &Document, name: MetadataName) -> Option<String> {
    document
        .metadata(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl PdfBackend for MupdfBackend {
    fn parse(&self, bytes: &[u8]) -> Result<PdfDocument, BackendError> {
        let document = Document::from_bytes(bytes, "application/pdf")
            .map_err(|e| BackendError::OpenError(e.to_string()))?;

        let info = PdfInfo {
            title: metadata(&document, MetadataName::Title),
            author: metadata(&document, MetadataName::Author),
            creation_date: metadata(&document, MetadataName::CreationDate),
            producer: metadata(&document, MetadataName::Producer),
        };
        let first_page = self.first_page_lines(&document)?;
        tracing::debug!(lines = first_page.len(), "decoded PDF first page");

        Ok(PdfDocument { info, first_page })
    }
}
