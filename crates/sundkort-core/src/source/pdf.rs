//! Embedded-text extraction from PDF cards using lopdf and pdf-extract.

use std::path::Path;

use lopdf::Document;
use tracing::debug;

use super::{CardLines, LineSource, SourceKind};
use crate::error::{PdfError, Result};
use crate::models::config::PdfConfig;

/// Line source reading the embedded text layer of a PDF.
///
/// Scanned PDFs without a text layer fail with [`PdfError::NoText`]; those
/// need an OCR provider instead.
pub struct PdfSource {
    data: Vec<u8>,
    config: PdfConfig,
}

impl PdfSource {
    pub fn new(data: Vec<u8>, config: PdfConfig) -> Self {
        Self { data, config }
    }

    pub fn from_file(path: &Path, config: PdfConfig) -> Result<Self> {
        Ok(Self::new(std::fs::read(path)?, config))
    }

    /// Load the document, decrypt it and drop pages beyond `max_pages`.
    ///
    /// Returns the bytes pdf-extract should read.
    fn prepare(&self) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(&self.data).map_err(|e| PdfError::Parse(e.to_string()))?;
        let mut rewritten = false;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted.into());
            }
            debug!("Decrypted PDF with empty password");
            rewritten = true;
        }

        let page_count = doc.get_pages().len() as u32;
        if page_count == 0 {
            return Err(PdfError::NoPages.into());
        }

        let max_pages = self.config.max_pages as u32;
        if max_pages > 0 && page_count > max_pages {
            let extra: Vec<u32> = (max_pages + 1..=page_count).collect();
            doc.delete_pages(&extra);
            debug!("Keeping {} of {} pages", max_pages, page_count);
            rewritten = true;
        }

        debug!("Loaded PDF with {} pages", page_count);

        if !rewritten {
            return Ok(self.data.clone());
        }

        let mut data = Vec::new();
        doc.save_to(&mut data)
            .map_err(|e| PdfError::Parse(format!("Failed to save PDF: {}", e)))?;
        Ok(data)
    }
}

impl LineSource for PdfSource {
    fn lines(&self) -> Result<CardLines> {
        let data = self.prepare()?;
        let text = pdf_extract::extract_text_from_mem(&data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        let length = text.trim().chars().count();
        if length < self.config.min_text_length {
            return Err(PdfError::NoText(length).into());
        }

        Ok(CardLines::from_text(&text))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Pdf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SundkortError;
    use lopdf::{dictionary, Object};

    fn empty_document() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let source = PdfSource::new(b"not a pdf".to_vec(), PdfConfig::default());
        assert!(matches!(
            source.lines(),
            Err(SundkortError::Pdf(PdfError::Parse(_)))
        ));
    }

    #[test]
    fn test_document_without_pages() {
        let source = PdfSource::new(empty_document(), PdfConfig::default());
        assert!(matches!(
            source.lines(),
            Err(SundkortError::Pdf(PdfError::NoPages))
        ));
        assert_eq!(source.kind(), SourceKind::Pdf);
    }
}
