//! ICICI transaction extraction.
//!
//! ICICI statements list transactions between a `TRANSACTION DETAILS`
//! heading and the `REWARDS SUMMARY` heading. Text extraction often breaks
//! a date over two lines:
//!
//! ```text
//! 15 Sep
//! 2025
//! Amazon India 2,499.00 Purchase
//! ```
//!
//! which is merged back into one transaction here. Single-line rows are
//! read as they are.

use std::sync::LazyLock;

use card_parser_statement_models::Transaction;
use regex::Regex;

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)TRANSACTION DETAILS(.*?)REWARDS SUMMARY").expect("valid regex")
});

static DAY_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d\d?\s+[A-Za-z]{3}$").expect("valid regex"));

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").expect("valid regex"));

static DETAILS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(.+?)\s+(\d{1,3}(?:,\d{3})*\.\d{2})\s+(Purchase|Cash\s*Advance|Finance\s*Charge)",
    )
    .expect("valid regex")
});

/// `date description amount type` anchored at the start of a line. Also
/// the VISA line fallback.
pub(crate) static SINGLE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d{1,2}\s+[A-Za-z]{3}\s+\d{4})\s+(.+?)\s+(\d{1,3}(?:,\d{3})*\.\d{2})\s+(Purchase|Cash\s*Advance|Finance\s*Charge)",
    )
    .expect("valid regex")
});

/// Builds a typed transaction from `date`, `description`, `amount`, `type`
/// captures, stripping thousands separators from the amount.
pub(crate) fn typed_transaction(
    date: &str,
    description: &str,
    amount: &str,
    kind: &str,
) -> Transaction {
    Transaction::new(
        date.trim(),
        description.trim(),
        amount.replace(',', "").trim(),
    )
    .with_kind(kind.trim())
}

/// The text between the transaction heading and the rewards heading, or
/// an empty string when either is missing.
#[must_use]
pub fn section(text: &str) -> &str {
    SECTION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str())
}

/// Extracts ICICI transactions from the full statement text.
#[must_use]
pub fn extract(text: &str) -> Vec<Transaction> {
    let lines: Vec<&str> = section(text)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut transactions = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if DAY_MONTH_RE.is_match(line) && i + 2 < lines.len() && YEAR_RE.is_match(lines[i + 1]) {
            let date = format!("{line} {}", lines[i + 1]);
            if let Some(caps) = DETAILS_RE.captures(lines[i + 2]) {
                transactions.push(typed_transaction(&date, &caps[1], &caps[2], &caps[3]));
            } else {
                log::debug!("ICICI: no details after wrapped date {date:?}");
            }
            i += 3;
            continue;
        }

        let row = SINGLE_LINE_RE
            .captures(line)
            .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0));
        if let Some(caps) = row {
            transactions.push(typed_transaction(&caps[1], &caps[2], &caps[3], &caps[4]));
        }
        i += 1;
    }

    transactions
}
