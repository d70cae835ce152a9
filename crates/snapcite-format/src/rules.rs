//! Declarative citation grammars.
//!
//! A style is an ordered list of [`Rule`]s. Every rule whose condition holds
//! is rendered and appended, so optional segments simply have no rule firing
//! and never leave stray punctuation behind.

/// Record fields a rule can be conditioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Publisher,
    Volume,
    Issue,
    Pages,
    Doi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Has(Field),
    Lacks(Field),
}

use Cond::{Has, Lacks};
use Field::{Doi, Issue, Pages, Publisher, Volume};

/// A template rendered when every condition in `when` holds.
///
/// Templates reference values as `{name}`; see [`Values::get`] for the names.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub when: &'static [Cond],
    pub template: &'static str,
}

const fn always(template: &'static str) -> Rule {
    Rule { when: &[], template }
}

const fn when(conds: &'static [Cond], template: &'static str) -> Rule {
    Rule {
        when: conds,
        template,
    }
}

pub const APA: &[Rule] = &[
    always("{author} ({year}). {title}"),
    when(&[Has(Doi)], ". {doi_url}"),
    when(&[Lacks(Doi), Has(Volume), Has(Publisher)], ". {publisher}, {volume}"),
    when(&[Lacks(Doi), Has(Volume), Lacks(Publisher)], ". {volume}"),
    when(&[Lacks(Doi), Has(Volume), Has(Issue)], "({issue})"),
    when(&[Lacks(Doi), Has(Volume), Has(Pages)], ", {pages}"),
    when(&[Lacks(Doi), Lacks(Volume)], ". Retrieved from {url}"),
];

pub const MLA: &[Rule] = &[
    always("{author}"),
    always(". \"{title}"),
    always(".\""),
    when(&[Has(Publisher)], " {publisher}"),
    when(&[Has(Volume)], ", vol. {volume}"),
    when(&[Has(Volume), Has(Issue)], ", no. {issue}"),
    when(&[Has(Pages)], ", {pages}"),
    always(", {published}"),
    when(&[Has(Doi)], ", doi:{doi}"),
    when(&[Lacks(Doi)], ", {url}"),
];

pub const CHICAGO: &[Rule] = &[
    always("{author}"),
    always(". \"{title}"),
    always(".\""),
    when(&[Has(Publisher)], " {publisher}"),
    when(&[Has(Volume)], " {volume}"),
    when(&[Has(Volume), Has(Issue)], ", no. {issue}"),
    when(&[Has(Pages)], " ({year}): {pages}"),
    when(&[Lacks(Pages)], ". Accessed {accessed}"),
    when(&[Has(Doi)], ". {doi_url}."),
    when(&[Lacks(Doi)], ". {url}."),
];

pub const HARVARD: &[Rule] = &[
    always("{author} ({year}) '{title}'"),
    when(&[Has(Publisher)], ", {publisher}"),
    when(&[Has(Volume)], ", {volume}"),
    when(&[Has(Volume), Has(Issue)], "({issue})"),
    when(&[Has(Pages)], ", pp. {pages}"),
    when(&[Has(Doi)], ". doi: {doi}"),
    when(&[Lacks(Doi)], ". Available at: {url} (Accessed: {accessed})"),
];

/// Everything a template can reference, already normalized: optional fields
/// are `None` when absent or blank.
#[derive(Debug, Default)]
pub struct Values<'a> {
    pub author: String,
    pub year: String,
    pub title: &'a str,
    pub publisher: Option<&'a str>,
    pub volume: Option<&'a str>,
    pub issue: Option<&'a str>,
    pub pages: Option<&'a str>,
    pub doi: Option<&'a str>,
    /// Resolver link for `doi`, empty without one.
    pub doi_url: String,
    pub url: &'a str,
    /// Style-formatted publication date or "n.d.".
    pub published: String,
    /// Style-formatted access date.
    pub accessed: String,
}

impl Values<'_> {
    fn has(&self, field: Field) -> bool {
        match field {
            Publisher => self.publisher.is_some(),
            Volume => self.volume.is_some(),
            Issue => self.issue.is_some(),
            Pages => self.pages.is_some(),
            Doi => self.doi.is_some(),
        }
    }

    fn holds(&self, cond: Cond) -> bool {
        match cond {
            Has(f) => self.has(f),
            Lacks(f) => !self.has(f),
        }
    }

    pub fn get(&self, name: &str) -> &str {
        match name {
            "author" => &self.author,
            "year" => &self.year,
            "title" => self.title,
            "publisher" => self.publisher.unwrap_or_default(),
            "volume" => self.volume.unwrap_or_default(),
            "issue" => self.issue.unwrap_or_default(),
            "pages" => self.pages.unwrap_or_default(),
            "doi" => self.doi.unwrap_or_default(),
            "doi_url" => &self.doi_url,
            "url" => self.url,
            "published" => &self.published,
            "accessed" => &self.accessed,
            _ => {
                tracing::debug!(name, "unknown template placeholder");
                ""
            }
        }
    }
}

/// Render every applicable rule, in order.
pub fn render(rules: &[Rule], values: &Values<'_>) -> String {
    let mut out = String::new();
    for rule in rules {
        if rule.when.iter().all(|&c| values.holds(c)) {
            push_piece(&mut out, &fill(rule.template, values));
        }
    }
    out
}

/// Substitute `{name}` placeholders.
fn fill(template: &str, values: &Values<'_>) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                out.push_str(values.get(&after[..close]));
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Append `piece`, dropping its leading period when `out` already ends in
/// terminal punctuation (possibly inside closing quotes), e.g. after "n.d.",
/// "et al." or a title ending in `?`.
fn push_piece(out: &mut String, piece: &str) {
    if let Some(rest) = piece.strip_prefix('.') {
        let kept = out.trim_end().len();
        if out[..kept]
            .trim_end_matches(['"', '\''])
            .ends_with(['.', '?', '!'])
        {
            out.truncate(kept);
            out.push_str(rest);
            return;
        }
    }
    out.push_str(piece);
}
