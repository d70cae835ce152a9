//! Per-field fallback chains.
//!
//! Each field is resolved by an ordered table of [`Strategy`] lookups; the
//! first lookup returning a non-empty value wins.

use url::Url;

use snapcite_core::find_doi;

use crate::document::{PageDocument, inner_text};
use crate::linked_data;

/// One independent way of reading a value from a page.
#[derive(Clone, Copy)]
pub enum Strategy {
    /// Attribute of the first matching element that has a non-empty value.
    Attr(&'static str, &'static str),
    /// Text of the first matching element with non-empty text.
    Text(&'static str),
    /// Arbitrary lookup.
    Custom(fn(&PageDocument) -> Option<String>),
}

impl Strategy {
    pub fn lookup(&self, doc: &PageDocument) -> Option<String> {
        match *self {
            Strategy::Attr(css, attr) => doc
                .select(css)
                .into_iter()
                .find_map(|el| el.value().attr(attr).and_then(non_empty)),
            Strategy::Text(css) => doc
                .select(css)
                .into_iter()
                .find_map(|el| non_empty(&inner_text(el))),
            Strategy::Custom(lookup) => lookup(doc).as_deref().and_then(non_empty),
        }
    }
}

/// Run `strategies` in order and return the first present value.
pub fn resolve(doc: &PageDocument, strategies: &[Strategy]) -> Option<String> {
    strategies.iter().find_map(|s| s.lookup(doc))
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

pub const TITLE: &[Strategy] = &[
    Strategy::Attr(r#"meta[property="og:title"]"#, "content"),
    Strategy::Attr(r#"meta[name="twitter:title"]"#, "content"),
    Strategy::Text("h1"),
    Strategy::Text("title"),
    Strategy::Custom(own_title),
];

pub const PUBLISHED_DATE: &[Strategy] = &[
    Strategy::Attr(r#"meta[property="article:published_time"]"#, "content"),
    Strategy::Attr(r#"meta[name="citation_publication_date"]"#, "content"),
    Strategy::Attr(r#"meta[name="publication_date"]"#, "content"),
    Strategy::Attr("time[datetime]", "datetime"),
    Strategy::Attr("time[pubdate]", "datetime"),
    Strategy::Attr(r#"[itemprop="datePublished"]"#, "content"),
];

pub const PUBLISHER: &[Strategy] = &[
    Strategy::Attr(r#"meta[property="og:site_name"]"#, "content"),
    Strategy::Attr(r#"meta[name="citation_journal_title"]"#, "content"),
    Strategy::Custom(microdata_publisher),
    Strategy::Custom(linked_data::publisher_name),
    Strategy::Custom(host_label),
];

pub const DOI: &[Strategy] = &[
    Strategy::Attr(r#"meta[name="citation_doi"]"#, "content"),
    Strategy::Attr("[data-doi]", "data-doi"),
    Strategy::Custom(doi_in_doi_class),
];

pub const VOLUME: &[Strategy] = &[Strategy::Attr(r#"meta[name="citation_volume"]"#, "content")];

pub const ISSUE: &[Strategy] = &[Strategy::Attr(r#"meta[name="citation_issue"]"#, "content")];

pub const FIRST_PAGE: &[Strategy] =
    &[Strategy::Attr(r#"meta[name="citation_firstpage"]"#, "content")];

pub const LAST_PAGE: &[Strategy] =
    &[Strategy::Attr(r#"meta[name="citation_lastpage"]"#, "content")];

pub const ABSTRACT: &[Strategy] = &[
    Strategy::Attr(r#"meta[name="citation_abstract"]"#, "content"),
    Strategy::Attr(r#"meta[name="description"]"#, "content"),
];

pub const KEYWORDS: &[Strategy] = &[Strategy::Attr(r#"meta[name="keywords"]"#, "content")];

pub const LANGUAGE: &[Strategy] = &[Strategy::Attr("html", "lang")];

/// Selectors whose matches are unioned when linked data has no authors.
pub const AUTHOR_SELECTORS: &[&str] = &[
    r#"meta[name="author"]"#,
    r#"meta[property="article:author"]"#,
    r#"meta[name="citation_author"]"#,
    ".author",
    ".byline",
    r#"[rel="author"]"#,
    r#"[itemprop="author"]"#,
    r#"meta[name="article:author"]"#,
    r#"meta[name="sailthru.author"]"#,
    ".p-author",
    ".author-name",
    ".ArticleAuthor",
    "#authors",
];

fn own_title(doc: &PageDocument) -> Option<String> {
    Some(doc.own_title())
}

fn microdata_publisher(doc: &PageDocument) -> Option<String> {
    doc.select(r#"[itemprop="publisher"] [itemprop="name"]"#)
        .into_iter()
        .find_map(|el| {
            el.value()
                .attr("content")
                .and_then(non_empty)
                .or_else(|| non_empty(&inner_text(el)))
        })
}

/// Hostname of the page location without a leading `www.`.
pub fn host_label(doc: &PageDocument) -> Option<String> {
    let url = Url::parse(doc.location()).ok()?;
    let host = url.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

fn doi_in_doi_class(doc: &PageDocument) -> Option<String> {
    doc.select(".doi")
        .into_iter()
        .find_map(|el| find_doi(&el.text().collect::<String>()))
}

/// `first` or `first-last`; nothing without a first page.
pub fn pages(doc: &PageDocument) -> Option<String> {
    let first = resolve(doc, FIRST_PAGE)?;
    Some(match resolve(doc, LAST_PAGE) {
        Some(last) => format!("{}-{}", first, last),
        None => first,
    })
}

pub fn keywords(doc: &PageDocument) -> Vec<String> {
    resolve(doc, KEYWORDS)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Linked-data authors, else the de-duplicated union of every author selector.
pub fn authors(doc: &PageDocument) -> Vec<String> {
    let structured = linked_data::authors(doc);
    if !structured.is_empty() {
        return structured;
    }

    let mut found: Vec<String> = Vec::new();
    let mut push = |value: Option<String>| {
        if let Some(v) = value
            && !found.contains(&v)
        {
            found.push(v);
        }
    };

    for css in AUTHOR_SELECTORS {
        for el in doc.select(css) {
            push(author_value(el));
        }
    }
    // Any element whose class mentions "author", case-insensitively.
    for el in doc.select("[class]") {
        let mentions_author = el
            .value()
            .attr("class")
            .is_some_and(|c| c.to_ascii_lowercase().contains("author"));
        if mentions_author {
            push(author_value(el));
        }
    }
    found
}

fn author_value(el: scraper::ElementRef<'_>) -> Option<String> {
    el.value()
        .attr("content")
        .and_then(non_empty)
        .or_else(|| non_empty(&inner_text(el)))
}
