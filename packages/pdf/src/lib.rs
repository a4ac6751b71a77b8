#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Text and table extraction for statement PDFs.
//!
//! Page text comes from [`pdf_extract`]; tables are detected from ruling
//! lines by interpreting each page's content stream with [`lopdf`]. The
//! primary entry point is [`PdfDocument`], which owns both views of a
//! loaded document and implements [`TableSource`] so parsing strategies can
//! ask for a page's tables without knowing how they were found.

pub mod content;
pub mod font;
pub mod geometry;
pub mod table;
pub mod text;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use table::{Table, TableSettings};
pub use text::{PageText, StatementText};

/// Errors specific to PDF extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// The document structure could not be loaded.
    #[error("PDF load error: {0}")]
    Load(#[from] lopdf::Error),

    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// A page's content stream could not be read or decoded.
    #[error("PDF content error on page {page}: {message}")]
    Content {
        /// 1-based page number.
        page: u32,
        /// What went wrong.
        message: String,
    },

    /// A page number outside the document was requested.
    #[error("PDF has no page {0}")]
    PageNotFound(u32),
}

/// Anything that can produce the ruled tables on a page.
pub trait TableSource {
    /// Returns the tables on `page_number` (1-based), top to bottom.
    ///
    /// # Errors
    ///
    /// * If the page does not exist or its content cannot be interpreted
    fn tables(&self, page_number: u32, settings: &TableSettings) -> Result<Vec<Table>, PdfError>;
}

/// A loaded statement PDF.
#[derive(Debug)]
pub struct PdfDocument {
    document: lopdf::Document,
    text: StatementText,
}

impl PdfDocument {
    /// Loads a document and extracts its page text.
    ///
    /// # Errors
    ///
    /// * [`PdfError::Load`] if the bytes are not a readable PDF
    /// * [`PdfError::Extraction`] if text extraction fails
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let document = lopdf::Document::load_mem(bytes)?;
        let pages = text::extract_pages(bytes)?;
        let text = StatementText::from_pages(pages);

        log::debug!(
            "Loaded PDF: {} pages, {} with text, {} characters",
            document.get_pages().len(),
            text.pages().len(),
            text.text().len()
        );

        Ok(Self { document, text })
    }

    /// Number of pages in the document.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// The extracted statement text.
    #[must_use]
    pub const fn text(&self) -> &StatementText {
        &self.text
    }

    /// Consumes the document, keeping only its text.
    #[must_use]
    pub fn into_text(self) -> StatementText {
        self.text
    }

    /// Positioned glyphs and painted edges of one page.
    ///
    /// # Errors
    ///
    /// * [`PdfError::PageNotFound`] or [`PdfError::Content`]
    pub fn page_objects(&self, page_number: u32) -> Result<content::PageObjects, PdfError> {
        content::page_objects(&self.document, page_number)
    }
}

impl TableSource for PdfDocument {
    fn tables(&self, page_number: u32, settings: &TableSettings) -> Result<Vec<Table>, PdfError> {
        let objects = self.page_objects(page_number)?;
        let tables = table::find_tables(&objects, settings);

        log::debug!("page {page_number}: found {} tables", tables.len());

        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{PageBuilder, PdfBuilder};

    #[test]
    fn loads_text_and_tables_from_generated_pdf() {
        let bytes = PdfBuilder::new()
            .page(PageBuilder::new().text(72, 72, "CARD STATEMENT"))
            .page(
                PageBuilder::new()
                    .text(72, 60, "TRANSACTION DETAILS")
                    .grid(&[70, 170, 370], &[100, 120, 140])
                    .text(75, 105, "Date")
                    .text(175, 105, "Description")
                    .text(75, 125, "01/09")
                    .text(175, 125, "COFFEE"),
            )
            .build()
            .unwrap();

        let pdf = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(pdf.page_count(), 2);
        assert!(pdf.text().text().contains("CARD STATEMENT"));
        assert!(pdf.text().pages()[1].text.contains("TRANSACTION DETAILS"));

        let settings = TableSettings {
            edge_min_length: 20.0,
            ..TableSettings::default()
        };
        assert!(pdf.tables(1, &settings).unwrap().is_empty());

        let tables = pdf.tables(2, &settings).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0].rows,
            vec![
                vec![Some("Date".to_string()), Some("Description".to_string())],
                vec![Some("01/09".to_string()), Some("COFFEE".to_string())],
            ]
        );
    }

    #[test]
    fn missing_page_is_reported() {
        let bytes = PdfBuilder::new()
            .page(PageBuilder::new().text(72, 72, "hello"))
            .build()
            .unwrap();
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();
        assert!(matches!(
            pdf.tables(5, &TableSettings::default()),
            Err(PdfError::PageNotFound(5))
        ));
    }

    #[test]
    fn corrupt_bytes_fail_to_load() {
        assert!(PdfDocument::from_bytes(b"%PDF-1.5 truncated").is_err());
    }
}
