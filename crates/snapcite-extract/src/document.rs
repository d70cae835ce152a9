use scraper::{ElementRef, Html, Selector};

/// A loaded page: parsed HTML plus the facts a browser would know about it.
pub struct PageDocument {
    html: Html,
    location: String,
    content_type: Option<String>,
    title: Option<String>,
}

impl PageDocument {
    /// Parse `html` as the page currently at `location`.
    pub fn parse(html: &str, location: impl Into<String>) -> Self {
        Self {
            html: Html::parse_document(html),
            location: location.into(),
            content_type: None,
            title: None,
        }
    }

    /// Set the MIME type the page was served with.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Override the document title property (defaults to the `<title>` text).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The document's own title: the title property if set, else the
    /// `<title>` element text, else empty.
    pub fn own_title(&self) -> String {
        if let Some(title) = &self.title {
            return title.trim().to_string();
        }
        self.select("title")
            .into_iter()
            .next()
            .map(inner_text)
            .unwrap_or_default()
    }

    /// True when the page is a PDF, by content type or `.pdf` location.
    pub fn is_pdf(&self) -> bool {
        let pdf_type = self.content_type().is_some_and(|ct| {
            ct.split(';')
                .next()
                .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/pdf"))
        });
        pdf_type || self.location().to_ascii_lowercase().ends_with(".pdf")
    }

    /// All elements matching `css`, in document order. An invalid selector
    /// matches nothing.
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.html.select(&selector).collect(),
            Err(e) => {
                tracing::debug!(selector = css, error = ?e, "invalid selector");
                vec![]
            }
        }
    }
}

/// Element text with whitespace runs collapsed and ends trimmed.
pub fn inner_text(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
