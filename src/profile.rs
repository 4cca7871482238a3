// src/profile.rs
//! Plain-text extraction from uploaded profile PDFs and company documents

use crate::error::{PitchError, PitchResult};
use crate::utils::get_file_extension;
use lopdf::Document;
use tracing::{info, warn};

/// Extract the text layer of a PDF, best effort.
///
/// Unreadable or encrypted documents are an `Extraction` error. Pages that fail
/// on their own are skipped, and a PDF without any text layer yields `""`.
pub fn extract_text(bytes: &[u8]) -> PitchResult<String> {
    if !bytes.starts_with(b"%PDF") {
        return Err(PitchError::Extraction("file is not a PDF".to_string()));
    }

    let document = Document::load_mem(bytes)
        .map_err(|e| PitchError::Extraction(format!("unreadable PDF: {}", e)))?;

    if document.is_encrypted() {
        return Err(PitchError::Extraction("PDF is encrypted".to_string()));
    }

    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    let mut text = String::new();

    for page in &pages {
        match document.extract_text(&[*page]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => warn!("Skipping unreadable PDF page {}: {}", page, e),
        }
    }

    if text.trim().is_empty() {
        warn!("PDF with {} page(s) has no extractable text", pages.len());
    } else {
        info!("Extracted {} characters from {} PDF page(s)", text.len(), pages.len());
    }

    Ok(text)
}

/// Extract text from an uploaded company document by file name
pub fn extract_document(file_name: &str, bytes: &[u8]) -> PitchResult<String> {
    match get_file_extension(file_name).as_deref() {
        Some("pdf") => extract_text(bytes),
        Some("txt") | Some("md") => String::from_utf8(bytes.to_vec())
            .map_err(|_| PitchError::Extraction(format!("{} is not valid UTF-8", file_name))),
        _ => Err(PitchError::Extraction(format!(
            "unsupported document type: {}. Use PDF, TXT or MD",
            file_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_pdf_is_extraction_error() {
        let result = extract_text(b"hello world");
        assert!(matches!(result, Err(PitchError::Extraction(_))));
    }

    #[test]
    fn test_truncated_pdf_is_extraction_error() {
        let result = extract_text(b"%PDF-1.7\n1 0 obj\n<<");
        assert!(matches!(result, Err(PitchError::Extraction(_))));
    }

    #[test]
    fn test_extract_document_dispatch() {
        assert_eq!(
            extract_document("deck.txt", b"We build k8s tooling").unwrap(),
            "We build k8s tooling"
        );
        assert!(matches!(
            extract_document("deck.docx", b"PK.."),
            Err(PitchError::Extraction(_))
        ));
        assert!(matches!(
            extract_document("notes.txt", &[0xff, 0xfe, 0x00]),
            Err(PitchError::Extraction(_))
        ));
    }
}
