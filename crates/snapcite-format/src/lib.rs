//! Citation string rendering.
//!
//! [`format`] is the whole public contract: a record and a style name in, a
//! citation string out. Unknown styles render as [`INVALID_FORMAT`].

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use snapcite_core::{CitationRecord, doi_url};
use snapcite_core::dates::{parse_date, year_of};

pub mod rules;

use rules::{Rule, Values};

/// Output for a style name that is not recognised.
pub const INVALID_FORMAT: &str = "invalid format";

/// Stand-in for a missing author list or year.
pub const NO_DATE: &str = "n.d.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Apa,
    Mla,
    Chicago,
    Harvard,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown citation style: {0}")]
pub struct UnknownStyle(pub String);

impl Style {
    pub const ALL: [Style; 4] = [Style::Apa, Style::Mla, Style::Chicago, Style::Harvard];

    pub fn name(self) -> &'static str {
        match self {
            Style::Apa => "APA",
            Style::Mla => "MLA",
            Style::Chicago => "Chicago",
            Style::Harvard => "Harvard",
        }
    }

    fn rules(self) -> &'static [Rule] {
        match self {
            Style::Apa => rules::APA,
            Style::Mla => rules::MLA,
            Style::Chicago => rules::CHICAGO,
            Style::Harvard => rules::HARVARD,
        }
    }

    /// Author segment after truncation.
    pub fn author_segment(self, authors: &[String]) -> String {
        let authors: Vec<&str> = authors
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();
        let Some(first) = authors.first() else {
            return NO_DATE.to_string();
        };

        match self {
            Style::Apa if authors.len() > 2 => format!("{} et al.", first),
            Style::Apa => authors.join(" & "),
            Style::Mla if authors.len() > 2 => format!("{}, et al", first),
            Style::Mla => authors.join(", and "),
            Style::Chicago | Style::Harvard if authors.len() > 3 => format!("{} et al.", first),
            Style::Chicago | Style::Harvard => authors.join(", "),
        }
    }

    /// Render `record` in this style, with `today` as the access date.
    pub fn render(self, record: &CitationRecord, today: NaiveDate) -> String {
        let published = record.published_date.as_deref().and_then(present);

        let values = Values {
            author: self.author_segment(&record.authors),
            year: published
                .and_then(year_of)
                .map(|y| y.to_string())
                .unwrap_or_else(|| NO_DATE.to_string()),
            title: record.title.trim(),
            publisher: record
                .publisher
                .as_deref()
                .and_then(present)
                .or_else(|| present(&record.site_name)),
            volume: record.volume.as_deref().and_then(present),
            issue: record.issue.as_deref().and_then(present),
            pages: record.pages.as_deref().and_then(present),
            doi: record.doi.as_deref().and_then(present),
            doi_url: record
                .doi
                .as_deref()
                .and_then(present)
                .map(doi_url)
                .unwrap_or_default(),
            url: record.url.trim(),
            published: published
                .and_then(parse_date)
                .map(|dt| dt.format("%-d %b %Y").to_string())
                .unwrap_or_else(|| NO_DATE.to_string()),
            accessed: match self {
                Style::Chicago => today.format("%B %-d, %Y").to_string(),
                _ => today.format("%-d %b %Y").to_string(),
            },
        };

        rules::render(self.rules(), &values)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Style::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}

fn present(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s) }
}

/// Format `record` in the named style, using today's UTC date for access
/// dates.
pub fn format(record: &CitationRecord, style: &str) -> String {
    format_at(record, style, Utc::now().date_naive())
}

/// Deterministic form of [`format`].
pub fn format_at(record: &CitationRecord, style: &str, today: NaiveDate) -> String {
    match style.parse::<Style>() {
        Ok(style) => style.render(record, today),
        Err(e) => {
            tracing::debug!(error = %e, "cannot format citation");
            INVALID_FORMAT.to_string()
        }
    }
}
