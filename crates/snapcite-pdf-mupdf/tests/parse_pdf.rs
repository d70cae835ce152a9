//! MuPDF decoding of a small PDF assembled in memory.

use snapcite_core::PdfBackend;
use snapcite_pdf::record_from_document;
use snapcite_pdf_mupdf::MupdfBackend;

const RUNNING_HEAD: &str = "Preprint. Under review.";
const TITLE: &str = "A Tiny Paper About Citations";
const DOI_LINE: &str = "doi: 10.5555/tiny.42";

/// One Helvetica page with a running head near the top edge, a title and a
/// DOI line, plus an `/Info` dictionary without a title.
fn tiny_pdf() -> Vec<u8> {
    let content = format!(
        "BT /F1 10 Tf 72 785 Td ({RUNNING_HEAD}) Tj ET\n\
         BT /F1 18 Tf 72 700 Td ({TITLE}) Tj ET\n\
         BT /F1 12 Tf 72 670 Td ({DOI_LINE}) Tj ET"
    );
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
        "<< /Author (Smith, J.; Doe, A.) /CreationDate (D:20210503120000Z) \
         /Producer (snapcite tests) >>"
            .to_string(),
    ];

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R /Info 6 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref
        )
        .as_bytes(),
    );
    out
}

#[test]
fn info_dictionary_fields() {
    let doc = MupdfBackend::new().parse(&tiny_pdf()).unwrap();
    assert_eq!(doc.info.title, None);
    assert_eq!(doc.info.author.as_deref(), Some("Smith, J.; Doe, A."));
    assert_eq!(doc.info.creation_date.as_deref(), Some("D:20210503120000Z"));
    assert_eq!(doc.info.producer.as_deref(), Some("snapcite tests"));
}

#[test]
fn running_head_is_cut_from_first_page() {
    let doc = MupdfBackend::new().parse(&tiny_pdf()).unwrap();
    assert_eq!(doc.first_page, vec![TITLE, DOI_LINE]);

    let doc = MupdfBackend::new()
        .with_header_exclusion(0.0)
        .parse(&tiny_pdf())
        .unwrap();
    assert_eq!(doc.first_page, vec![RUNNING_HEAD, TITLE, DOI_LINE]);
}

#[test]
fn decoded_pdf_becomes_a_record() {
    let doc = MupdfBackend::new().parse(&tiny_pdf()).unwrap();
    let record = record_from_document(&doc, "https://papers.example/tiny.pdf");

    assert_eq!(record.title, TITLE);
    assert_eq!(record.authors, vec!["Smith, J.", "Doe, A."]);
    assert_eq!(record.published_date.as_deref(), Some("2021-05-03T12:00:00.000Z"));
    assert_eq!(record.publisher.as_deref(), Some("snapcite tests"));
    assert_eq!(record.doi.as_deref(), Some("10.5555/tiny.42"));
    assert_eq!(record.url, "https://papers.example/tiny.pdf");
}
