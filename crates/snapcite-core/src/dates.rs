//! Date parsing and normalization.
//!
//! Everything that leaves this module is either a `DateTime<Utc>` or the
//! ISO-8601 form produced by [`to_iso8601`]. Inputs without a zone are
//! read as UTC.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse a date string in any of the commonly embedded forms.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    // Partial dates: "2021-05" and "2021"
    static PARTIAL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(\d{4})(?:[-/](\d{1,2}))?$").unwrap());
    let caps = PARTIAL_RE.captures(raw)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps
        .get(2)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1);
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Render a timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn to_iso8601(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse `raw` and re-render it as ISO-8601. `None` when unparseable.
pub fn normalize_date(raw: &str) -> Option<String> {
    parse_date(raw).map(|dt| to_iso8601(&dt))
}

/// Convert a PDF date (`D:YYYYMMDDHHmmSSOHH'mm'`) to ISO-8601.
///
/// Any prefix of at least the year is accepted. Strings that are not in PDF
/// form go through [`normalize_date`].
pub fn normalize_pdf_date(raw: &str) -> Option<String> {
    static PDF_DATE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^(?:D:)?(\d{4})(\d{2})?(\d{2})?(\d{2})?(\d{2})?(\d{2})?(?:(Z)|([+-])(\d{2})'?(\d{2})?'?)?",
        )
        .unwrap()
    });

    let raw = raw.trim();
    let Some(caps) = PDF_DATE_RE.captures(raw) else {
        return normalize_date(raw);
    };
    // A bare 4-digit run inside some other format ("2021-05-03") is not a PDF date.
    if caps.get(0).map(|m| m.end()) != Some(raw.len()) && !raw.starts_with("D:") {
        return normalize_date(raw);
    }

    let num = |i: usize, default: u32| -> u32 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(default)
    };
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let naive = NaiveDate::from_ymd_opt(year, num(2, 1), num(3, 1))?
        .and_hms_opt(num(4, 0), num(5, 0), num(6, 0))?;

    let offset_secs = match caps.get(8).map(|m| m.as_str()) {
        Some(sign) => {
            let secs = (num(9, 0) * 3600 + num(10, 0) * 60) as i32;
            if sign == "-" { -secs } else { secs }
        }
        None => 0,
    };
    let offset = FixedOffset::east_opt(offset_secs)?;
    let dt = offset.from_local_datetime(&naive).single()?;
    Some(to_iso8601(&dt.with_timezone(&Utc)))
}

/// Year of a stored date, if it can be read.
pub fn year_of(raw: &str) -> Option<i32> {
    if let Some(dt) = parse_date(raw) {
        return Some(dt.year());
    }
    static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(1\d{3}|2\d{3})\b").unwrap());
    YEAR_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_is_normalized_to_utc_millis() {
        assert_eq!(
            normalize_date("2021-05-03T00:00:00Z"),
            Some("2021-05-03T00:00:00.000Z".into())
        );
        assert_eq!(
            normalize_date("2020-01-15T10:30:00+02:00"),
            Some("2020-01-15T08:30:00.000Z".into())
        );
    }

    #[test]
    fn date_only_is_midnight_utc() {
        assert_eq!(
            normalize_date("2019-11-07"),
            Some("2019-11-07T00:00:00.000Z".into())
        );
        assert_eq!(
            normalize_date("2019/11/07"),
            Some("2019-11-07T00:00:00.000Z".into())
        );
    }

    #[test]
    fn partial_dates() {
        assert_eq!(normalize_date("2018"), Some("2018-01-01T00:00:00.000Z".into()));
        assert_eq!(normalize_date("2018-06"), Some("2018-06-01T00:00:00.000Z".into()));
    }

    #[test]
    fn long_form_dates() {
        assert_eq!(
            normalize_date("March 4, 2022"),
            Some("2022-03-04T00:00:00.000Z".into())
        );
        assert_eq!(
            normalize_date("Tue, 1 Jul 2003 10:52:37 +0200"),
            Some("2003-07-01T08:52:37.000Z".into())
        );
    }

    #[test]
    fn offset_without_colon() {
        assert_eq!(
            normalize_date("2021-05-03T10:00:00.000+0000"),
            Some("2021-05-03T10:00:00.000Z".into())
        );
        assert_eq!(
            normalize_date("2021-05-03T10:00:00.250-0500"),
            Some("2021-05-03T15:00:00.250Z".into())
        );
        assert_eq!(
            normalize_date("2021-05-03T10:00:00+0200"),
            Some("2021-05-03T08:00:00.000Z".into())
        );
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(normalize_date("yesterday"), None);
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("2021-13-45"), None);
    }

    #[test]
    fn pdf_dates() {
        assert_eq!(
            normalize_pdf_date("D:20210503120000Z"),
            Some("2021-05-03T12:00:00.000Z".into())
        );
        assert_eq!(
            normalize_pdf_date("D:20210503120000+02'00'"),
            Some("2021-05-03T10:00:00.000Z".into())
        );
        assert_eq!(
            normalize_pdf_date("D:2021"),
            Some("2021-01-01T00:00:00.000Z".into())
        );
        assert_eq!(
            normalize_pdf_date("2021-05-03"),
            Some("2021-05-03T00:00:00.000Z".into())
        );
        assert_eq!(normalize_pdf_date("D:garbage"), None);
    }

    #[test]
    fn year_extraction() {
        assert_eq!(year_of("2021-05-03T00:00:00Z"), Some(2021));
        assert_eq!(year_of("Spring 1999"), Some(1999));
        assert_eq!(year_of("unknown"), None);
    }
}
