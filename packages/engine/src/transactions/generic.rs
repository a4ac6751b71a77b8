//! Line-per-transaction extraction used for banks without a dedicated
//! layout.

use std::sync::LazyLock;

use card_parser_statement_models::Transaction;
use regex::Regex;

use crate::rules::{AMOUNT, DATE};

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*({DATE})\s+(.+?)\s+({AMOUNT})\s*$")).expect("valid regex")
});

/// Extracts at most `max_rows` transactions from lines shaped like
/// `12-05-2024 Grocery Store 1,234.56`.
///
/// Amounts keep their thousands separators. Descriptions wrapped onto a
/// following line are not merged.
#[must_use]
pub fn extract<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    max_rows: usize,
) -> Vec<Transaction> {
    lines
        .into_iter()
        .filter_map(|line| {
            let caps = LINE_RE.captures(line)?;
            Some(Transaction::new(&caps[1], caps[2].trim(), caps[3].trim()))
        })
        .take(max_rows)
        .collect()
}
