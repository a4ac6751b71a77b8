//! Per-bank strategy selection.

use card_parser_pdf::{PdfError, StatementText, TableSource};
use card_parser_statement_models::{BankIdentity, ExtractedData};

use crate::config::ParserConfig;
use crate::fields::FieldProfile;
use crate::transactions::{generic, icici, visa};

/// Runs the field recognizers and transaction extractor chosen for `bank`.
///
/// # Errors
///
/// * If the VISA strategy cannot read a page's tables
pub fn extract(
    bank: BankIdentity,
    text: &StatementText,
    tables: &dyn TableSource,
    config: &ParserConfig,
) -> Result<ExtractedData, PdfError> {
    let mut data = FieldProfile::for_bank(bank).extract(text.text());

    data.transactions = match bank {
        BankIdentity::Hdfc | BankIdentity::Idfc | BankIdentity::Citi | BankIdentity::Unknown => {
            generic::extract(text.lines(), config.transactions.max_rows)
        }
        BankIdentity::Icici => icici::extract(text.text()),
        BankIdentity::Visa => visa::extract(text, tables, &config.tables)?,
    };

    Ok(data)
}
