//! Citation metadata from PDF documents.
//!
//! Decoding is delegated to a [`PdfBackend`]; this crate fetches the bytes,
//! runs the backend off the async runtime, and turns embedded properties plus
//! first-page text into a [`CitationRecord`].

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use snapcite_core::dates::normalize_pdf_date;
use snapcite_core::{
    BackendError, CitationRecord, Config, DEFAULT_FETCH_TIMEOUT, DEFAULT_USER_AGENT, PdfBackend,
    PdfDocument, find_doi,
};

pub mod heuristics;
pub mod mock;

pub use heuristics::{find_authors, find_title, split_authors};

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("failed to fetch PDF: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("PDF request returned HTTP {0}")]
    Status(u16),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("PDF parse task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Fetches PDFs and builds citation records from them.
pub struct PdfAdapter {
    client: reqwest::Client,
    backend: Arc<dyn PdfBackend>,
    timeout: Duration,
    user_agent: String,
}

impl PdfAdapter {
    pub fn new(backend: Arc<dyn PdfBackend>) -> Self {
        Self {
            client: reqwest::Client::new(),
            backend,
            timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Adapter using the timeout and user agent from `config`.
    pub fn from_config(backend: Arc<dyn PdfBackend>, config: &Config) -> Self {
        Self::new(backend)
            .with_timeout(config.fetch_timeout())
            .with_user_agent(config.user_agent.clone())
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Fetch and parse the PDF at `url`.
    ///
    /// Any failure (network, HTTP status, undecodable document) is logged and
    /// reported as `None`; callers show a "could not extract" message.
    pub async fn extract_from_pdf(&self, url: &str) -> Option<CitationRecord> {
        match self.try_extract_from_pdf(url).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(url, error = %e, "PDF extraction failed");
                None
            }
        }
    }

    pub async fn try_extract_from_pdf(&self, url: &str) -> Result<CitationRecord, PdfError> {
        let bytes = self.fetch(url).await?;
        self.extract_from_bytes(bytes, url).await
    }

    /// Download the raw PDF body.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, PdfError> {
        let resp = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PdfError::Status(resp.status().as_u16()));
        }

        let bytes = resp.bytes().await?;
        tracing::debug!(url, bytes = bytes.len(), "fetched PDF");
        Ok(bytes.to_vec())
    }

    /// Build a record from PDF bytes already in memory. `url` is recorded as
    /// the citation location.
    pub async fn extract_from_bytes(
        &self,
        bytes: Vec<u8>,
        url: &str,
    ) -> Result<CitationRecord, PdfError> {
        // Backends are CPU-bound; keep them off the async workers.
        let backend = Arc::clone(&self.backend);
        let document = tokio::task::spawn_blocking(move || backend.parse(&bytes)).await??;
        Ok(record_from_document(&document, url))
    }
}

/// Turn a decoded PDF into a citation record.
///
/// Embedded properties win; the title falls back to the first plausible
/// first-page line and then to the file name in `url`, authors fall back to
/// an `Authors:` run in the page text.
pub fn record_from_document(document: &PdfDocument, url: &str) -> CitationRecord {
    let info = &document.info;
    let text = document.page_text();

    let title = present(info.title.as_deref())
        .or_else(|| find_title(&document.first_page))
        .or_else(|| file_name(url))
        .unwrap_or_default();

    let mut record = CitationRecord::minimal(title, url);
    record.authors = find_authors(info.author.as_deref(), &text);
    record.published_date = present(info.creation_date.as_deref()).and_then(|raw| {
        let normalized = normalize_pdf_date(&raw);
        if normalized.is_none() {
            tracing::debug!(raw = %raw, "unparseable PDF creation date");
        }
        normalized
    });
    record.set_publisher(present(info.producer.as_deref()));
    record.doi = find_doi(&text);

    tracing::debug!(
        title = %record.title,
        authors = record.authors.len(),
        doi = record.doi.as_deref().unwrap_or(""),
        "extracted PDF citation record"
    );
    record
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Last path segment of `url`, which is what a browser shows as the title of
/// a PDF it has no title for.
fn file_name(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.rev().find(|s| !s.is_empty())?;
    present(Some(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapcite_core::PdfInfo;

    fn document(info: PdfInfo, lines: &[&str]) -> PdfDocument {
        PdfDocument {
            info,
            first_page: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn embedded_properties_win() {
        let doc = document(
            PdfInfo {
                title: Some("Embedded Title".into()),
                author: Some("Smith, J.; Doe, A.".into()),
                creation_date: Some("D:20210503120000Z".into()),
                producer: Some("LaTeX with hyperref".into()),
            },
            &["A Different First Line Title", "doi: 10.1234/abcd.5678"],
        );
        let record = record_from_document(&doc, "https://example.org/paper.pdf");

        assert_eq!(record.title, "Embedded Title");
        assert_eq!(record.authors, vec!["Smith, J.", "Doe, A."]);
        assert_eq!(
            record.published_date.as_deref(),
            Some("2021-05-03T12:00:00.000Z")
        );
        assert_eq!(record.publisher.as_deref(), Some("LaTeX with hyperref"));
        assert_eq!(record.site_name, "LaTeX with hyperref");
        assert_eq!(record.doi.as_deref(), Some("10.1234/abcd.5678"));
        assert_eq!(record.url, "https://example.org/paper.pdf");
        assert!(!record.is_pdf);
    }

    #[test]
    fn heuristics_fill_missing_properties() {
        let doc = document(
            PdfInfo {
                title: Some("   ".into()),
                ..Default::default()
            },
            &[
                "Authors: Alice Chen, Bob Diaz",
                "Abstract",
                "Learning to Cite from First Pages",
            ],
        );
        let record = record_from_document(&doc, "https://example.org/x.pdf");

        assert_eq!(record.title, "Learning to Cite from First Pages");
        assert_eq!(record.authors, vec!["Alice Chen", "Bob Diaz"]);
        assert_eq!(record.published_date, None);
        assert_eq!(record.publisher, None);
        assert_eq!(record.site_name, "");
        assert_eq!(record.doi, None);
    }

    #[test]
    fn title_falls_back_to_file_name() {
        let doc = document(PdfInfo::default(), &["tiny"]);
        let record = record_from_document(&doc, "https://arxiv.org/pdf/1706.03762v7.pdf?x=1");
        assert_eq!(record.title, "1706.03762v7.pdf");

        let record = record_from_document(&doc, "not a url");
        assert_eq!(record.title, "");
    }

    #[test]
    fn garbage_creation_date_is_absent() {
        let doc = document(
            PdfInfo {
                creation_date: Some("yesterday-ish".into()),
                ..Default::default()
            },
            &[],
        );
        assert_eq!(record_from_document(&doc, "https://a.b/c.pdf").published_date, None);
    }
}
