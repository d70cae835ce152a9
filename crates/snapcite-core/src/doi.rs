use once_cell::sync::Lazy;
use regex::Regex;

/// DOI pattern shared by the HTML extractor and the PDF adapter.
pub const DOI_PATTERN: &str = r"(?i)10\.\d{4,}/[-._;()/:A-Z0-9]+";

static DOI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(DOI_PATTERN).unwrap());

/// Return the first DOI found in `text`.
pub fn find_doi(text: &str) -> Option<String> {
    DOI_RE.find(text).map(|m| m.as_str().to_string())
}

/// Resolver URL for a DOI.
pub fn doi_url(doi: &str) -> String {
    format!("https://doi.org/{}", doi)
}
