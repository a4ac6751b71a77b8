#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Credit-card statement recognition engine.
//!
//! Turns the bytes of a statement PDF into a [`StatementRecord`]:
//!
//! 1. the PDF's text is extracted ([`card_parser_pdf`]),
//! 2. the issuing bank is identified from keywords ([`bank`]),
//! 3. the bank's field rules and transaction strategy are run
//!    ([`dispatch`]).
//!
//! Recognition is best-effort. A field that cannot be found is `None`; only
//! an unreadable document is an error.

pub mod bank;
pub mod config;
pub mod dispatch;
pub mod fields;
pub mod rules;
pub mod transactions;
pub mod upload;

use card_parser_pdf::{PdfDocument, PdfError, StatementText, TableSource};
use card_parser_statement_models::{ParseResponse, StatementRecord};

pub use config::{ConfigError, ParserConfig};
pub use upload::UploadError;

/// Errors from parsing a statement.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The upload was rejected before parsing.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// The document could not be read.
    #[error("An error occurred while processing the file: {0}")]
    Pdf(#[from] PdfError),
}

impl ParseError {
    /// Whether the caller supplied bad input, as opposed to the document
    /// failing to process.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Upload(_))
    }
}

/// Parses an already extracted statement.
///
/// `tables` is consulted only by strategies that read ruled tables.
///
/// # Errors
///
/// * If a strategy needs tables and they cannot be read
pub fn parse_statement(
    text: &StatementText,
    tables: &dyn TableSource,
    config: &ParserConfig,
) -> Result<StatementRecord, PdfError> {
    if text.is_empty() {
        log::warn!("Statement has no extractable text");
    }
    let bank = bank::identify(text.text());
    let extracted_data = dispatch::extract(bank, text, tables, config)?;

    log::info!(
        "Detected {bank}: {} transactions, {} of 4 fields",
        extracted_data.transactions.len(),
        [
            &extracted_data.last_4_digits,
            &extracted_data.total_balance,
            &extracted_data.payment_due_date,
            &extracted_data.billing_cycle,
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
    );

    Ok(StatementRecord {
        detected_bank: bank,
        extracted_data,
    })
}

/// Parses the bytes of a statement PDF.
///
/// # Errors
///
/// * [`ParseError::Pdf`] if the document cannot be loaded or read
pub fn parse(bytes: &[u8], config: &ParserConfig) -> Result<StatementRecord, ParseError> {
    let pdf = PdfDocument::from_bytes(bytes)?;
    Ok(parse_statement(pdf.text(), &pdf, config)?)
}

/// Validates an uploaded file and parses it into a response envelope.
///
/// # Errors
///
/// * [`ParseError::Upload`] if the file name is not acceptable
/// * [`ParseError::Pdf`] if the document cannot be loaded or read
pub fn parse_upload(
    filename: &str,
    bytes: &[u8],
    config: &ParserConfig,
) -> Result<ParseResponse, ParseError> {
    upload::validate_filename(filename)?;
    let record = parse(bytes, config)?;

    Ok(ParseResponse {
        filename: filename.to_string(),
        record,
    })
}

#[cfg(test)]
mod tests {
    use card_parser_pdf::fixtures::{PageBuilder, PdfBuilder};
    use card_parser_pdf::{Table, TableSettings};
    use card_parser_statement_models::{BankIdentity, Transaction};

    use super::*;

    struct NoTables;

    impl TableSource for NoTables {
        fn tables(&self, _: u32, _: &TableSettings) -> Result<Vec<Table>, PdfError> {
            Ok(Vec::new())
        }
    }

    fn parse_text(text: &str) -> StatementRecord {
        parse_statement(
            &StatementText::from_text(text),
            &NoTables,
            &ParserConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn hdfc_wins_over_visa_and_uses_generic_lines() {
        let record = parse_text(
            "HDFC Bank VISA Credit Card Statement\n12-05-2024 Grocery Store 1,234.56\n",
        );
        assert_eq!(record.detected_bank, BankIdentity::Hdfc);
        assert_eq!(
            record.extracted_data.transactions,
            vec![Transaction::new("12-05-2024", "Grocery Store", "1,234.56")]
        );
    }

    #[test]
    fn missing_balance_leaves_other_fields() {
        let record = parse_text(
            "IDFC FIRST Bank\nCard Number: XXXX XXXX XXXX 4321\nPayment Due Date: 05-06-2024\nStatement Date: 20-05-2024",
        );
        let data = &record.extracted_data;
        assert_eq!(record.detected_bank, BankIdentity::Idfc);
        assert_eq!(data.total_balance, None);
        assert_eq!(data.last_4_digits.as_deref(), Some("4321"));
        assert_eq!(data.payment_due_date.as_deref(), Some("05-06-2024"));
        assert_eq!(data.billing_cycle.as_deref(), Some("20-05-2024"));
    }

    #[test]
    fn icici_statement_merges_wrapped_dates() {
        let record = parse_text(
            "ICICI Bank Credit Card\nStatement Date 23 Oct 2025\nPayment Due Date 12 Nov 2025\nTotal Amount Due 12,345.67\nTRANSACTION DETAILS\n15 Sep\n2025\nAmazon India 2,499.00 Purchase\nREWARDS SUMMARY",
        );
        let data = &record.extracted_data;
        assert_eq!(record.detected_bank, BankIdentity::Icici);
        assert_eq!(data.billing_cycle.as_deref(), Some("23 Oct 2025"));
        assert_eq!(data.payment_due_date.as_deref(), Some("12 Nov 2025"));
        assert_eq!(data.total_balance.as_deref(), Some("12,345.67"));
        let expected = Transaction::new("15 Sep 2025", "Amazon India", "2499.00");
        assert_eq!(data.transactions, vec![expected.with_kind("Purchase")]);
    }

    #[test]
    fn generic_cap_comes_from_config() {
        let lines: String = (1..=60)
            .map(|i| format!("01-01-2025 Item {i} {i}.00\n"))
            .collect();
        let record = parse_text(&format!("Citibank statement\n{lines}"));
        assert_eq!(record.detected_bank, BankIdentity::Citi);
        assert_eq!(record.extracted_data.transactions.len(), 50);

        let mut config = ParserConfig::default();
        config.transactions.max_rows = 5;
        let text = StatementText::from_text(lines);
        let record = parse_statement(&text, &NoTables, &config).unwrap();
        assert_eq!(record.detected_bank, BankIdentity::Unknown);
        assert_eq!(record.extracted_data.transactions.len(), 5);
    }

    #[test]
    fn empty_text_is_unknown_with_nothing_found() {
        let record = parse_text("");
        assert_eq!(record.detected_bank, BankIdentity::Unknown);
        assert_eq!(record.extracted_data, Default::default());
    }

    #[test]
    fn parses_generated_hdfc_pdf() {
        let bytes = PdfBuilder::new()
            .page(PageBuilder::new().lines(
                50,
                50,
                &[
                    "HDFC Bank Credit Card Statement",
                    "Card No: XXXX XXXX XXXX 1234",
                    "Total Amount Due: 12,345.67",
                    "Payment Due Date: 05-06-2024",
                    "12-05-2024 Grocery Store 1,234.56",
                ],
            ))
            .build()
            .unwrap();

        let record = parse(&bytes, &ParserConfig::default()).unwrap();
        let data = &record.extracted_data;
        assert_eq!(record.detected_bank, BankIdentity::Hdfc);
        assert_eq!(data.last_4_digits.as_deref(), Some("1234"));
        assert_eq!(data.total_balance.as_deref(), Some("12,345.67"));
        assert_eq!(data.payment_due_date.as_deref(), Some("05-06-2024"));
        assert_eq!(data.transactions.len(), 1);
        assert_eq!(data.transactions[0].description, "Grocery Store");
    }

    fn visa_pdf() -> Vec<u8> {
        PdfBuilder::new()
            .page(PageBuilder::new().lines(
                50,
                50,
                &[
                    "VISA Card Statement",
                    "Card Number: XXXX XXXX XXXX 9012",
                    "Total Amount Due: 2,499.00",
                    "Payment Due Date: 12 Nov 2025",
                    "Statement Date: 23 Oct 2025",
                ],
            ))
            .page(
                PageBuilder::new()
                    .text(50, 60, "TRANSACTION DETAILS")
                    .grid(&[50, 150, 350, 450, 550], &[100, 120, 140])
                    .text(55, 105, "Date")
                    .text(155, 105, "Description")
                    .text(355, 105, "Amount")
                    .text(455, 105, "Type")
                    .text(55, 125, "15 Sep 2025")
                    .text(155, 125, "Amazon India")
                    .text(355, 125, "2,499.00")
                    .text(455, 125, "Purchase"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn parses_visa_table_rows() {
        let record = parse(&visa_pdf(), &ParserConfig::default()).unwrap();
        let data = &record.extracted_data;
        assert_eq!(record.detected_bank, BankIdentity::Visa);
        assert_eq!(data.last_4_digits.as_deref(), Some("9012"));
        assert_eq!(data.payment_due_date.as_deref(), Some("12 Nov 2025"));
        assert_eq!(data.billing_cycle.as_deref(), Some("23 Oct 2025"));
        let expected = Transaction::new("15 Sep 2025", "Amazon India", "2499.00");
        assert_eq!(data.transactions, vec![expected.with_kind("Purchase")]);
    }

    #[test]
    fn identical_bytes_give_identical_records() {
        let bytes = visa_pdf();
        let config = ParserConfig::default();
        assert_eq!(
            parse(&bytes, &config).unwrap(),
            parse(&bytes, &config).unwrap()
        );
    }

    #[test]
    fn upload_validation_runs_before_parsing() {
        let config = ParserConfig::default();
        let err = parse_upload("statement.txt", b"not a pdf", &config).unwrap_err();
        assert!(err.is_client_error());
        assert!(matches!(err, ParseError::Upload(UploadError::InvalidExtension(_))));

        let err = parse_upload("statement.pdf", b"not a pdf", &config).unwrap_err();
        assert!(!err.is_client_error());
        assert!(matches!(err, ParseError::Pdf(_)));
    }

    #[test]
    fn upload_envelope_carries_filename() {
        let response = parse_upload("visa.PDF", &visa_pdf(), &ParserConfig::default()).unwrap();
        assert_eq!(response.filename, "visa.PDF");
        assert_eq!(response.record.detected_bank, BankIdentity::Visa);
    }
}
