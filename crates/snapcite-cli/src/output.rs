use std::io::Write;

use chrono::{DateTime, Local};
use owo_colors::OwoColorize;

use snapcite_core::{CitationRecord, SavedCitation};
use snapcite_format::Style;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

pub const PDF_FAILURE: &str = "Could not extract citation data from this PDF";

/// Print a formatted citation under its style name.
pub fn print_citation(
    w: &mut dyn Write,
    style: Style,
    citation: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", style.name().bold().cyan())?;
    } else {
        writeln!(w, "{}", style.name())?;
    }
    writeln!(w, "{}", citation)
}

/// Print the raw record as pretty JSON.
pub fn print_record_json(w: &mut dyn Write, record: &CitationRecord) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(record).map_err(std::io::Error::other)?;
    writeln!(w, "{}", json)
}

pub fn print_saved_confirmation(w: &mut dyn Write, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", "Citation saved.".green())
    } else {
        writeln!(w, "Citation saved.")
    }
}

/// Print saved citations, newest first, with the index `saved delete` takes.
pub fn print_saved_list(
    w: &mut dyn Write,
    entries: &[SavedCitation],
    color: ColorMode,
) -> std::io::Result<()> {
    if entries.is_empty() {
        return writeln!(w, "No saved citations.");
    }

    for (i, entry) in entries.iter().enumerate() {
        let when = DateTime::from_timestamp_millis(entry.timestamp)
            .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown time".to_string());
        if color.enabled() {
            writeln!(
                w,
                "[{}] {} {}",
                i,
                entry.title.bold(),
                format!("({}, {})", entry.format, when).dimmed()
            )?;
        } else {
            writeln!(w, "[{}] {} ({}, {})", i, entry.title, entry.format, when)?;
        }
        writeln!(w, "    {}", entry.text)?;
    }
    Ok(())
}

pub fn print_styles(w: &mut dyn Write, default: Style) -> std::io::Result<()> {
    for style in Style::ALL {
        if style == default {
            writeln!(w, "{} (default)", style)?;
        } else {
            writeln!(w, "{}", style)?;
        }
    }
    Ok(())
}

pub fn print_warning(w: &mut dyn Write, message: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "WARNING:".yellow(), message)
    } else {
        writeln!(w, "WARNING: {}", message)
    }
}

pub fn print_pdf_failure(w: &mut dyn Write, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", PDF_FAILURE.red())
    } else {
        writeln!(w, "{}", PDF_FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> String {
        let mut buf: Vec<u8> = Vec::new();
        let w: &mut dyn Write = &mut buf;
        f(w).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plain_citation_output() {
        let out = render(|w| print_citation(w, Style::Harvard, "Doe (2020) 'T'", ColorMode(false)));
        assert_eq!(out, "Harvard\nDoe (2020) 'T'\n");
    }

    #[test]
    fn saved_list_shows_indices() {
        let entries = vec![
            SavedCitation {
                title: "Newer".into(),
                text: "B.".into(),
                format: "MLA".into(),
                timestamp: 1_700_000_000_000,
            },
            SavedCitation {
                title: "Older".into(),
                text: "A.".into(),
                format: "APA".into(),
                timestamp: 1_600_000_000_000,
            },
        ];
        let out = render(|w| print_saved_list(w, &entries, ColorMode(false)));
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("[0] Newer (MLA, "));
        assert_eq!(lines[1], "    B.");
        assert!(lines[2].starts_with("[1] Older (APA, "));

        let out = render(|w| print_saved_list(w, &[], ColorMode(false)));
        assert_eq!(out, "No saved citations.\n");
    }

    #[test]
    fn styles_mark_default() {
        let out = render(|w| print_styles(w, Style::Mla));
        assert_eq!(out, "APA\nMLA (default)\nChicago\nHarvard\n");
    }

    #[test]
    fn record_json_uses_wire_names() {
        let record = CitationRecord::minimal("T", "https://x.example");
        let out = render(|w| print_record_json(w, &record));
        assert!(out.contains("\"siteName\": \"\""));
        assert!(out.contains("\"url\": \"https://x.example\""));
    }
}
