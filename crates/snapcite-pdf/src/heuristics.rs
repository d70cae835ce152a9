use once_cell::sync::Lazy;
use regex::Regex;

/// Lines must be longer than this (in characters) to be taken as a title.
const MIN_TITLE_CHARS: usize = 10;

/// Pick a title from first-page lines: the first line longer than
/// [`MIN_TITLE_CHARS`] that mentions neither "abstract" nor starts with a
/// by-line / "Authors:" prefix.
pub fn find_title(lines: &[String]) -> Option<String> {
    static BYLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(by|authors?)\b").unwrap());

    lines
        .iter()
        .map(|line| line.trim())
        .find(|line| {
            line.chars().count() > MIN_TITLE_CHARS
                && !line.to_lowercase().contains("abstract")
                && !BYLINE_RE.is_match(line)
        })
        .map(String::from)
}

/// Authors from the embedded Author property, else from an `Authors:` run at
/// the start of the first-page text.
pub fn find_authors(embedded: Option<&str>, page_text: &str) -> Vec<String> {
    if let Some(embedded) = embedded.map(str::trim).filter(|a| !a.is_empty()) {
        return split_authors(embedded);
    }

    static AUTHORS_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)^authors?:?\s*(.*?)(?:\n|abstract)").unwrap());

    AUTHORS_RE
        .captures(page_text)
        .and_then(|caps| caps.get(1))
        .map(|m| split_authors(m.as_str()))
        .unwrap_or_default()
}

/// Split an author list on `;`/`&` when semicolons are used as separators
/// (so "Smith, J." stays whole), else on `,`/`&`. Connector tokens "and" /
/// "et al" and empty tokens are dropped.
pub fn split_authors(list: &str) -> Vec<String> {
    let separators: &[char] = if list.contains(';') {
        &[';', '&']
    } else {
        &[',', ';', '&']
    };

    list.split(separators)
        .map(str::trim)
        .filter(|token| {
            !token.is_empty()
                && !token.eq_ignore_ascii_case("and")
                && !token.eq_ignore_ascii_case("et al")
        })
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn title_skips_short_abstract_and_byline() {
        let page = lines(&[
            "arXiv 2024",
            "By Jane Smith and John Doe",
            "Abstract: we study things",
            "  Attention Is All You Need  ",
            "Another long line here",
        ]);
        assert_eq!(find_title(&page).as_deref(), Some("Attention Is All You Need"));
    }

    #[test]
    fn title_allows_words_starting_with_by() {
        let page = lines(&["Byzantine Fault Tolerance Revisited"]);
        assert_eq!(
            find_title(&page).as_deref(),
            Some("Byzantine Fault Tolerance Revisited")
        );
    }

    #[test]
    fn title_none_when_nothing_qualifies() {
        assert_eq!(find_title(&lines(&["short", "Authors: A, B"])), None);
        assert_eq!(find_title(&[]), None);
    }

    #[test]
    fn embedded_author_with_semicolons_keeps_inverted_names() {
        assert_eq!(
            find_authors(Some("Smith, J.; Doe, A."), ""),
            vec!["Smith, J.", "Doe, A."]
        );
    }

    #[test]
    fn embedded_author_comma_and_ampersand() {
        assert_eq!(
            find_authors(Some("Ada Lovelace, Charles Babbage & Mary Somerville"), "ignored"),
            vec!["Ada Lovelace", "Charles Babbage", "Mary Somerville"]
        );
    }

    #[test]
    fn blank_embedded_author_falls_back_to_text() {
        let text = "Authors: Alice Chen, Bob Diaz, and, et al Abstract We present";
        assert_eq!(find_authors(Some("  "), text), vec!["Alice Chen", "Bob Diaz"]);
    }

    #[test]
    fn text_authors_stop_at_newline() {
        let text = "author: Q. Liu & R. Roe\nSome title line";
        assert_eq!(find_authors(None, text), vec!["Q. Liu", "R. Roe"]);
    }

    #[test]
    fn text_without_authors_prefix_yields_nothing() {
        let text = "A Paper Title Authors: Someone Abstract";
        assert!(find_authors(None, text).is_empty());
    }
}
