use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use snapcite_core::{CitationRecord, Config};
use snapcite_extract::{PageDocument, extract};
use snapcite_pdf::PdfAdapter;

/// Where a citation comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// An http(s) URL.
    Remote(String),
    LocalHtml(PathBuf),
    LocalPdf(PathBuf),
}

impl Source {
    pub fn classify(arg: &str) -> anyhow::Result<Self> {
        if let Ok(url) = url::Url::parse(arg)
            && matches!(url.scheme(), "http" | "https")
        {
            return Ok(Source::Remote(arg.to_string()));
        }

        let path = PathBuf::from(arg);
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => Ok(Source::LocalPdf(path)),
            Some("html" | "htm" | "xhtml") => Ok(Source::LocalHtml(path)),
            _ => anyhow::bail!(
                "Unsupported source {}: expected an http(s) URL or a .html/.pdf file",
                arg
            ),
        }
    }
}

/// Result of resolving a source.
#[derive(Debug)]
pub enum Resolved {
    Record(CitationRecord),
    /// The source was a PDF and the adapter could not read it.
    PdfFailed,
}

/// Fetches pages, routes PDFs to the adapter and runs extraction.
pub struct Resolver {
    client: reqwest::Client,
    adapter: PdfAdapter,
    config: Config,
}

impl Resolver {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.fetch_timeout())
            .build()
            .context("failed to build HTTP client")?;
        let adapter = PdfAdapter::from_config(
            Arc::new(snapcite_pdf_mupdf::MupdfBackend::new()),
            &config,
        )
        .with_client(client.clone());
        Ok(Self {
            client,
            adapter,
            config,
        })
    }

    pub async fn resolve(&self, source: &Source) -> anyhow::Result<Resolved> {
        match source {
            Source::Remote(url) => self.resolve_remote(url).await,
            Source::LocalHtml(path) => {
                let location = file_location(path)?;
                let html = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let record = extract_off_thread(html, location.clone(), None).await?;
                self.follow_pdf_marker(record, &location).await
            }
            Source::LocalPdf(path) => {
                let location = file_location(path)?;
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Ok(self.pdf_from_bytes(bytes, &location).await)
            }
        }
    }

    async fn resolve_remote(&self, url: &str) -> anyhow::Result<Resolved> {
        if looks_like_pdf(url) {
            return Ok(self.pdf_from_url(url).await);
        }

        let resp = self
            .client
            .get(url)
            .timeout(self.config.fetch_timeout())
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", url))?;
        if !resp.status().is_success() {
            anyhow::bail!("{} returned HTTP {}", url, resp.status().as_u16());
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        // Redirects may land somewhere else; cite the final location.
        let location = resp.url().to_string();

        if content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("application/pdf"))
        {
            let bytes = resp.bytes().await.context("failed to read PDF body")?;
            return Ok(self.pdf_from_bytes(bytes.to_vec(), &location).await);
        }

        let html = resp.text().await.context("failed to read page body")?;
        let record = extract_off_thread(html, location.clone(), content_type).await?;
        self.follow_pdf_marker(record, &location).await
    }

    async fn follow_pdf_marker(
        &self,
        record: CitationRecord,
        location: &str,
    ) -> anyhow::Result<Resolved> {
        if !record.is_pdf {
            return Ok(Resolved::Record(record));
        }
        if location.starts_with("file:") {
            let path = url::Url::parse(location)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .with_context(|| format!("cannot map {} to a local path", location))?;
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            return Ok(self.pdf_from_bytes(bytes, location).await);
        }
        Ok(self.pdf_from_url(location).await)
    }

    async fn pdf_from_url(&self, url: &str) -> Resolved {
        match self.adapter.extract_from_pdf(url).await {
            Some(record) => Resolved::Record(record),
            None => Resolved::PdfFailed,
        }
    }

    async fn pdf_from_bytes(&self, bytes: Vec<u8>, location: &str) -> Resolved {
        match self.adapter.extract_from_bytes(bytes, location).await {
            Ok(record) => Resolved::Record(record),
            Err(e) => {
                tracing::warn!(location, error = %e, "PDF extraction failed");
                Resolved::PdfFailed
            }
        }
    }
}

/// Extraction over a freshly parsed page, on the blocking pool.
async fn extract_off_thread(
    html: String,
    location: String,
    content_type: Option<String>,
) -> anyhow::Result<CitationRecord> {
    // scraper's `Html` is not Send, so parse and extract in one closure.
    let record = tokio::task::spawn_blocking(move || {
        let mut doc = PageDocument::parse(&html, &location);
        if let Some(ct) = content_type {
            doc = doc.with_content_type(ct);
        }
        extract(&doc)
    })
    .await
    .context("extraction task failed")?;
    Ok(record)
}

/// URL path ends in `.pdf`, ignoring case, query and fragment.
pub fn looks_like_pdf(url: &str) -> bool {
    url::Url::parse(url)
        .map(|u| u.path().to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false)
}

/// `file://` URL for a local path, used as the citation location.
pub fn file_location(path: &Path) -> anyhow::Result<String> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("cannot resolve {}", path.display()))?;
    url::Url::from_file_path(&absolute)
        .map(|u| u.to_string())
        .map_err(|_| anyhow::anyhow!("cannot express {} as a file URL", absolute.display()))
}
