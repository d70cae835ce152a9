use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;
pub mod dates;
pub mod doi;
pub mod message;
pub mod store;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend, PdfDocument, PdfInfo};
pub use doi::{DOI_PATTERN, doi_url, find_doi};
pub use message::{Request, Response};
pub use store::{
    KeyValueStore, MemoryStore, SAVED_CITATIONS_KEY, SavedCitation, SavedCitations, SqliteStore,
    StoreError,
};

/// Language reported when a document does not declare one.
pub const DEFAULT_LANGUAGE: &str = "en";

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Normalized bibliographic data extracted from a web page or PDF.
///
/// This is the only type shared between extraction and formatting. `url` is
/// always set, `authors` is empty rather than missing, and every `Option`
/// field may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    /// ISO-8601 UTC timestamp, e.g. `2021-05-03T00:00:00.000Z`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    /// `"N"` or `"N-M"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
    pub url: String,
    /// Mirrors `publisher`; empty when no publisher is known.
    #[serde(default)]
    pub site_name: String,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Set only by the HTML extractor when the location is a PDF; the caller
    /// routes such records to the PDF adapter.
    #[serde(default, rename = "isPDF", skip_serializing_if = "std::ops::Not::not")]
    pub is_pdf: bool,
}

impl Default for CitationRecord {
    fn default() -> Self {
        Self {
            title: String::new(),
            authors: vec![],
            published_date: None,
            publisher: None,
            doi: None,
            volume: None,
            issue: None,
            pages: None,
            url: String::new(),
            site_name: String::new(),
            abstract_text: None,
            keywords: vec![],
            language: default_language(),
            is_pdf: false,
        }
    }
}

impl CitationRecord {
    /// A record carrying only a title and location, every other field empty.
    pub fn minimal(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// The `{isPDF: true, url}` marker returned for PDF locations.
    pub fn pdf_marker(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_pdf: true,
            ..Self::default()
        }
    }

    /// Set `publisher` and mirror it into `site_name`.
    pub fn set_publisher(&mut self, publisher: Option<String>) {
        self.site_name = publisher.clone().unwrap_or_default();
        self.publisher = publisher;
    }
}

/// Default user agent for page and PDF fetches.
pub const DEFAULT_USER_AGENT: &str = concat!("snapcite/", env!("CARGO_PKG_VERSION"));

/// Default timeout for page and PDF fetches.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Style identifier used when none is given on the command line.
    pub default_style: String,
    /// SQLite file holding saved citations. `None` uses the platform data dir.
    pub store_path: Option<PathBuf>,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_style: "APA".to_string(),
            store_path: None,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Overlay the values present in a config file onto the defaults.
    pub fn from_file(file: &config_file::ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            default_style: file
                .citation
                .as_ref()
                .and_then(|c| c.default_style.clone())
                .unwrap_or(defaults.default_style),
            store_path: file
                .storage
                .as_ref()
                .and_then(|s| s.store_path.as_ref())
                .map(PathBuf::from),
            fetch_timeout_secs: file
                .network
                .as_ref()
                .and_then(|n| n.fetch_timeout_secs)
                .unwrap_or(defaults.fetch_timeout_secs),
            user_agent: file
                .network
                .as_ref()
                .and_then(|n| n.user_agent.clone())
                .unwrap_or(defaults.user_agent),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Where saved citations live: the configured path, else
    /// `<data_dir>/snapcite/citations.db`.
    pub fn resolved_store_path(&self) -> Option<PathBuf> {
        self.store_path.clone().or_else(|| {
            dirs::data_dir().map(|d| d.join("snapcite").join("citations.db"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let mut record = CitationRecord::minimal("A Title", "https://example.com/a");
        record.published_date = Some("2021-05-03T00:00:00.000Z".into());
        record.set_publisher(Some("Example".into()));
        record.abstract_text = Some("Summary".into());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["publishedDate"], "2021-05-03T00:00:00.000Z");
        assert_eq!(json["siteName"], "Example");
        assert_eq!(json["abstract"], "Summary");
        assert_eq!(json["language"], "en");
        assert!(json.get("isPDF").is_none());
        assert!(json.get("doi").is_none());
    }

    #[test]
    fn pdf_marker_round_trips_flag() {
        let json = serde_json::to_string(&CitationRecord::pdf_marker("https://x.org/a.pdf")).unwrap();
        assert!(json.contains("\"isPDF\":true"));
        let back: CitationRecord = serde_json::from_str(&json).unwrap();
        assert!(back.is_pdf);
        assert!(back.authors.is_empty());
        assert_eq!(back.language, "en");
    }

    #[test]
    fn set_publisher_mirrors_site_name() {
        let mut record = CitationRecord::default();
        record.set_publisher(None);
        assert_eq!(record.site_name, "");
        record.set_publisher(Some("Nature".into()));
        assert_eq!(record.site_name, "Nature");
        assert_eq!(record.publisher.as_deref(), Some("Nature"));
    }

    #[test]
    fn config_from_partial_file_keeps_defaults() {
        let file = config_file::ConfigFile {
            citation: Some(config_file::CitationConfig {
                default_style: Some("MLA".into()),
            }),
            ..Default::default()
        };
        let config = Config::from_file(&file);
        assert_eq!(config.default_style, "MLA");
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert!(config.store_path.is_none());
    }
}
