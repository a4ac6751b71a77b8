//! Plain-text extraction, page by page.

use std::panic;

use crate::PdfError;

/// Text of a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page number in the source document.
    pub number: u32,
    /// Extracted text.
    pub text: String,
}

/// The full text content of a statement.
///
/// Pages whose text is blank are dropped; the remaining pages are joined
/// with `"\n"` in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementText {
    pages: Vec<PageText>,
    text: String,
}

impl StatementText {
    /// Builds the statement text from per-page texts.
    #[must_use]
    pub fn from_pages(pages: Vec<PageText>) -> Self {
        let pages: Vec<PageText> = pages
            .into_iter()
            .filter(|page| !page.text.trim().is_empty())
            .collect();
        let text = pages
            .iter()
            .map(|page| page.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Self { pages, text }
    }

    /// Treats `text` as a single-page statement.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_pages(vec![PageText {
            number: 1,
            text: text.into(),
        }])
    }

    /// The concatenated text of every non-blank page.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lines of the concatenated text, in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// The non-blank pages, in page order.
    #[must_use]
    pub fn pages(&self) -> &[PageText] {
        &self.pages
    }

    /// Whether no page carried any text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Extracts the text of every page of a PDF.
///
/// # Errors
///
/// * [`PdfError::Extraction`] if the text extractor reports an error or
///   panics on malformed input
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<PageText>, PdfError> {
    let result = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            PdfError::Extraction(format!("text extractor panicked: {reason}"))
        })?;

    let texts = result
        .map_err(|e| PdfError::Extraction(format!("failed to extract text from PDF: {e}")))?;

    Ok(texts
        .into_iter()
        .zip(1u32..)
        .map(|(text, number)| {
            log::debug!("page {number}: extracted {} characters", text.len());
            PageText { number, text }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, text: &str) -> PageText {
        PageText {
            number,
            text: text.to_string(),
        }
    }

    #[test]
    fn blank_pages_are_skipped_and_rest_joined() {
        let text = StatementText::from_pages(vec![
            page(1, "HDFC Bank"),
            page(2, "  \n "),
            page(3, "Total Due: 1,000.00"),
        ]);

        assert_eq!(text.text(), "HDFC Bank\nTotal Due: 1,000.00");
        assert_eq!(text.pages().len(), 2);
        assert_eq!(text.pages()[1].number, 3);
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn all_blank_pages_give_empty_text() {
        let text = StatementText::from_pages(vec![page(1, ""), page(2, "\n")]);
        assert!(text.is_empty());
        assert_eq!(text.text(), "");
        assert_eq!(text.lines().count(), 0);
    }

    #[test]
    fn garbage_bytes_are_an_extraction_error() {
        let err = extract_pages(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, PdfError::Extraction(_)));
    }
}
