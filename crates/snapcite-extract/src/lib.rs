//! Citation metadata extraction from loaded HTML pages.
//!
//! [`extract`] never fails: a field whose fallback chain is exhausted stays
//! empty, and an unexpected failure yields a record holding only the page's
//! own title and location.

use thiserror::Error;

use snapcite_core::dates::normalize_date;
use snapcite_core::{CitationRecord, DEFAULT_LANGUAGE, Request, Response};

pub mod document;
pub mod linked_data;
pub mod strategy;

pub use document::PageDocument;
pub use linked_data::Agent;
pub use strategy::{Strategy, resolve};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid page location {location:?}: {source}")]
    InvalidLocation {
        location: String,
        #[source]
        source: url::ParseError,
    },
}

/// Extract a citation record from `doc`.
///
/// PDF locations short-circuit to [`CitationRecord::pdf_marker`]; the caller
/// is expected to hand those to the PDF adapter.
pub fn extract(doc: &PageDocument) -> CitationRecord {
    match try_extract(doc) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(location = doc.location(), error = %e, "citation extraction failed");
            CitationRecord::minimal(doc.own_title(), doc.location())
        }
    }
}

/// Like [`extract`] but reports total failure instead of degrading.
pub fn try_extract(doc: &PageDocument) -> Result<CitationRecord, ExtractError> {
    if doc.is_pdf() {
        tracing::debug!(location = doc.location(), "PDF location, deferring to PDF adapter");
        return Ok(CitationRecord::pdf_marker(doc.location()));
    }

    url::Url::parse(doc.location()).map_err(|source| ExtractError::InvalidLocation {
        location: doc.location().to_string(),
        source,
    })?;

    let mut record = CitationRecord::minimal(
        resolve(doc, strategy::TITLE).unwrap_or_else(|| doc.own_title()),
        doc.location(),
    );
    record.authors = strategy::authors(doc);
    record.published_date = resolve(doc, strategy::PUBLISHED_DATE).and_then(|raw| {
        let normalized = normalize_date(&raw);
        if normalized.is_none() {
            tracing::debug!(raw = %raw, "unparseable publication date");
        }
        normalized
    });
    record.set_publisher(resolve(doc, strategy::PUBLISHER));
    record.doi = resolve(doc, strategy::DOI);
    record.volume = resolve(doc, strategy::VOLUME);
    record.issue = resolve(doc, strategy::ISSUE);
    record.pages = strategy::pages(doc);
    record.abstract_text = resolve(doc, strategy::ABSTRACT);
    record.keywords = strategy::keywords(doc);
    record.language =
        resolve(doc, strategy::LANGUAGE).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    tracing::debug!(
        title = %record.title,
        authors = record.authors.len(),
        doi = record.doi.as_deref().unwrap_or(""),
        "extracted citation record"
    );
    Ok(record)
}

/// Parse `html` served from `location` and extract from it.
pub fn extract_html(html: &str, location: &str) -> CitationRecord {
    extract(&PageDocument::parse(html, location))
}

/// Answer a hosting-shell request about `doc`.
pub fn respond(request: &Request, doc: &PageDocument) -> Response {
    match request {
        Request::GetCitationData => Response { data: extract(doc) },
    }
}
