use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Document information dictionary entries used for citations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    /// Raw `CreationDate` value, usually `D:YYYYMMDDHHmmSS...`.
    pub creation_date: Option<String>,
    pub producer: Option<String>,
}

/// What a backend hands to the PDF adapter: embedded properties plus the
/// text lines of page one in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfDocument {
    pub info: PdfInfo,
    pub first_page: Vec<String>,
}

impl PdfDocument {
    /// First-page text with lines joined by single spaces.
    pub fn page_text(&self) -> String {
        self.first_page.join(" ")
    }
}

/// Trait for PDF parsing backends.
///
/// Implementors only decode the byte stream; title/author/DOI heuristics
/// live in `snapcite_pdf::PdfAdapter`.
pub trait PdfBackend: Send + Sync {
    /// Parse an in-memory PDF.
    fn parse(&self, bytes: &[u8]) -> Result<PdfDocument, BackendError>;
}
