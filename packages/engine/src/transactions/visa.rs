//! VISA transaction extraction.
//!
//! VISA statements print transactions in a ruled table headed
//! `Date | Description | Amount | Type`. Only pages whose own text carries
//! the configured section marker are searched for tables. When no table
//! row is found anywhere, each text line is searched for a
//! `date description amount type` run instead.

use card_parser_pdf::{PdfError, StatementText, Table, TableSource};
use card_parser_statement_models::Transaction;

use super::icici::{SINGLE_LINE_RE, typed_transaction};
use crate::config::TableConfig;

/// Extracts VISA transactions, preferring ruled tables.
///
/// # Errors
///
/// * If a marked page's tables cannot be read from the document
pub fn extract(
    text: &StatementText,
    source: &dyn TableSource,
    config: &TableConfig,
) -> Result<Vec<Transaction>, PdfError> {
    let mut transactions = Vec::new();

    for page in text
        .pages()
        .iter()
        .filter(|page| page.text.contains(config.section_marker.as_str()))
    {
        for table in source.tables(page.number, &config.settings)? {
            let rows = table_transactions(&table);
            log::debug!(
                "VISA: page {} table with {} rows gave {} transactions",
                page.number,
                table.rows.len(),
                rows.len()
            );
            transactions.extend(rows);
        }
    }

    if transactions.is_empty() {
        log::debug!("VISA: no table rows, falling back to line patterns");
        transactions = fallback(text.lines());
    }

    Ok(transactions)
}

fn cell(row: &[Option<String>], idx: usize) -> &str {
    row.get(idx).and_then(Option::as_deref).unwrap_or("")
}

/// Rows of a transaction table, or nothing when the header does not name
/// both a date and a description column.
#[must_use]
pub fn table_transactions(table: &Table) -> Vec<Transaction> {
    let Some((header, body)) = table.rows.split_first() else {
        return Vec::new();
    };
    if body.is_empty() {
        return Vec::new();
    }

    let headers: Vec<String> = header
        .iter()
        .map(|c| c.as_deref().unwrap_or("").trim().to_lowercase())
        .collect();
    if !headers.iter().any(|h| h == "date") || !headers.iter().any(|h| h == "description") {
        return Vec::new();
    }

    body.iter()
        .filter(|row| row.len() >= 4)
        .filter(|row| cell(row, 2).chars().any(|c| c.is_ascii_digit()))
        .map(|row| {
            Transaction::new(
                cell(row, 0).trim(),
                cell(row, 1).split_whitespace().collect::<Vec<_>>().join(" "),
                cell(row, 2).replace(',', "").trim(),
            )
            .with_kind(cell(row, 3).trim())
        })
        .collect()
}

/// Searches each line for a typed transaction anywhere in it.
#[must_use]
pub fn fallback<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<Transaction> {
    lines
        .into_iter()
        .filter_map(|line| {
            let caps = SINGLE_LINE_RE.captures(line)?;
            Some(typed_transaction(&caps[1], &caps[2], &caps[3], &caps[4]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use card_parser_pdf::{PageText, TableSettings, geometry::BBox};

    use super::*;

    struct StaticTables(BTreeMap<u32, Vec<Table>>);

    impl TableSource for StaticTables {
        fn tables(
            &self,
            page_number: u32,
            _settings: &TableSettings,
        ) -> Result<Vec<Table>, PdfError> {
            Ok(self.0.get(&page_number).cloned().unwrap_or_default())
        }
    }

    /// Empty strings become `None` cells.
    fn table(rows: &[&[&str]]) -> Table {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| (!c.is_empty()).then(|| (*c).to_string()))
                    .collect()
            })
            .collect();
        Table {
            rows,
            bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
        }
    }

    fn statement(pages: &[&str]) -> StatementText {
        StatementText::from_pages(
            pages
                .iter()
                .zip(1u32..)
                .map(|(text, number)| PageText {
                    number,
                    text: (*text).to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn reads_rows_of_marked_pages() {
        let text = statement(&["VISA Card Statement", "TRANSACTION DETAILS\n..."]);
        let marked = table(&[
            &[" Date ", "DESCRIPTION", "Amount", "Type"],
            &["15 Sep 2025", "Amazon\n  India", "2,499.00", " Purchase "],
            &["16 Sep 2025", "Note", "-", "Fee"],
            &["17 Sep 2025", "Short row", "10.00"],
            &["18 Sep 2025", "", "1,000.00", ""],
        ]);
        let tables = StaticTables(BTreeMap::from([(2, vec![marked])]));

        let txns = extract(&text, &tables, &TableConfig::default()).unwrap();
        assert_eq!(
            txns,
            vec![
                Transaction::new("15 Sep 2025", "Amazon India", "2499.00").with_kind("Purchase"),
                Transaction::new("18 Sep 2025", "", "1000.00").with_kind(""),
            ]
        );
    }

    #[test]
    fn unmarked_pages_are_not_searched() {
        let text = statement(&["Transaction Details (lower case)"]);
        let unmarked = table(&[
            &["Date", "Description", "Amount", "Type"],
            &["15 Sep 2025", "Shop", "1.00", "Purchase"],
        ]);
        let tables = StaticTables(BTreeMap::from([(1, vec![unmarked])]));
        let txns = extract(&text, &tables, &TableConfig::default()).unwrap();
        assert!(txns.is_empty());
    }

    #[test]
    fn header_must_name_date_and_description() {
        let t = table(&[
            &["Posted", "Description", "Amount", "Type"],
            &["15 Sep 2025", "Shop", "1.00", "Purchase"],
        ]);
        assert!(table_transactions(&t).is_empty());
        let header_only = table(&[&["Date", "Description"]]);
        assert!(table_transactions(&header_only).is_empty());
    }

    #[test]
    fn falls_back_to_line_search_without_table_rows() {
        let text = statement(&[
            "VISA Card\nTRANSACTION DETAILS\nRef 15 Sep 2025 Amazon India 2,499.00 Purchase",
        ]);
        let tables = StaticTables(BTreeMap::new());
        let txns = extract(&text, &tables, &TableConfig::default()).unwrap();
        let expected = Transaction::new("15 Sep 2025", "Amazon India", "2499.00");
        assert_eq!(txns, vec![expected.with_kind("Purchase")]);
    }

    #[test]
    fn table_errors_propagate() {
        struct Broken;
        impl TableSource for Broken {
            fn tables(&self, page_number: u32, _: &TableSettings) -> Result<Vec<Table>, PdfError> {
                Err(PdfError::PageNotFound(page_number))
            }
        }

        let text = statement(&["TRANSACTION DETAILS"]);
        assert!(matches!(
            extract(&text, &Broken, &TableConfig::default()),
            Err(PdfError::PageNotFound(1))
        ));
    }
}
