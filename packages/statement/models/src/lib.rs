#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Output types for credit-card statement parsing.
//!
//! Every statement, whatever bank issued it, is reduced to a
//! [`StatementRecord`]: the detected [`BankIdentity`] plus an
//! [`ExtractedData`] block whose scalar fields are all independently
//! optional. The JSON field names here are part of the public output
//! surface and must not change.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The institution a statement was issued by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum BankIdentity {
    /// HDFC Bank
    Hdfc,
    /// ICICI Bank
    Icici,
    /// IDFC FIRST Bank
    Idfc,
    /// Citibank
    Citi,
    /// Generic VISA-branded card statement
    Visa,
    /// No keyword matched
    Unknown,
}

/// A single statement line item.
///
/// All values are kept as the text found in the statement; amounts are
/// never parsed into numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction date as printed (e.g. `"12-05-2024"`, `"15 Sep 2025"`).
    pub date: String,
    /// Merchant or narration text.
    pub description: String,
    /// Amount as printed, or with thousands separators removed for banks
    /// whose strategy normalizes it.
    pub amount: String,
    /// Transaction type (e.g. `"Purchase"`), when the layout carries one.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Transaction {
    /// Creates a transaction without a type column.
    #[must_use]
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount: amount.into(),
            kind: None,
        }
    }

    /// Sets the transaction type.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// Fields recognized in a statement.
///
/// Missing values serialize as `null`; `transactions` is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedData {
    /// Last four digits of the card number.
    pub last_4_digits: Option<String>,
    /// Total amount due, exactly as printed.
    pub total_balance: Option<String>,
    /// Payment due date, exactly as printed.
    pub payment_due_date: Option<String>,
    /// Statement period range, or the single statement date.
    pub billing_cycle: Option<String>,
    /// Transactions in document order.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// The complete result of parsing one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRecord {
    /// Bank the statement was attributed to.
    pub detected_bank: BankIdentity,
    /// Recognized fields and transactions.
    pub extracted_data: ExtractedData,
}

/// Response envelope for one uploaded statement file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResponse {
    /// Name of the uploaded file.
    pub filename: String,
    /// Parsed statement contents.
    #[serde(flatten)]
    pub record: StatementRecord,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn bank_identity_uses_upper_case_tags() {
        assert_eq!(BankIdentity::Hdfc.to_string(), "HDFC");
        assert_eq!(BankIdentity::Unknown.as_ref(), "UNKNOWN");
        assert_eq!(BankIdentity::from_str("HDFC").unwrap(), BankIdentity::Hdfc);
        assert_eq!(
            serde_json::to_string(&BankIdentity::Visa).unwrap(),
            "\"VISA\""
        );
    }

    #[test]
    fn transaction_type_is_omitted_when_absent() {
        let plain = Transaction::new("12-05-2024", "Grocery Store", "1,234.56");
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("type").is_none());

        let typed = Transaction::new("15 Sep 2025", "Book", "100.00").with_kind("Purchase");
        let json = serde_json::to_value(&typed).unwrap();
        assert_eq!(json["type"], "Purchase");
    }

    #[test]
    fn response_envelope_keeps_field_names() {
        let response = ParseResponse {
            filename: "statement.pdf".to_string(),
            record: StatementRecord {
                detected_bank: BankIdentity::Citi,
                extracted_data: ExtractedData {
                    last_4_digits: Some("4321".to_string()),
                    ..ExtractedData::default()
                },
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["filename"], "statement.pdf");
        assert_eq!(json["detected_bank"], "CITI");
        assert_eq!(json["extracted_data"]["last_4_digits"], "4321");
        assert!(json["extracted_data"]["total_balance"].is_null());
        assert!(json["extracted_data"]["payment_due_date"].is_null());
        assert!(json["extracted_data"]["billing_cycle"].is_null());
        assert_eq!(json["extracted_data"]["transactions"], serde_json::json!([]));
    }
}
