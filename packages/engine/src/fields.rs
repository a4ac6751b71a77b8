//! Scalar field recognizers.
//!
//! Every bank is served by a [`FieldProfile`]: one ordered rule list per
//! field. Most banks share the same lists; ICICI and VISA swap in stricter
//! date rules written for their "15 Sep 2025" style, and VISA reads the
//! card number from its masked form.

use std::sync::LazyLock;

use card_parser_statement_models::{BankIdentity, ExtractedData};

use crate::rules::{AMOUNT, DATE, FieldRule, Normalize, first_match};

static SHARED_LAST_4: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            r"(?i)card\s*(?:no|number|ending)[:\s]*([0-9Xx\-\s]{4,})",
            1,
            Normalize::LastFourDigits,
        )
        .decisive(),
        FieldRule::new(r"([0-9]{4})(?:[^0-9]|$)", 1, Normalize::Trim),
    ]
});

static MASKED_LAST_4: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![FieldRule::new(
        r"X{2,4}[-\s]*X{2,4}[-\s]*X{2,4}[-\s]*([0-9]{4})(?:[^0-9]|$)",
        1,
        Normalize::Trim,
    )]
});

static SHARED_TOTAL_BALANCE: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    [
        r"total\s*(?:amount\s*)?due",
        r"total\s*outstanding\s*",
        r"new\s*balance",
        r"total\s*due",
    ]
    .iter()
    .map(|label| {
        let pattern = format!(r"(?i){label}[:\s]*({AMOUNT})");
        FieldRule::new(&pattern, 1, Normalize::Trim)
    })
    .collect()
});

static SHARED_DUE_DATE: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            &format!(r"(?i)(?:payment\s*due\s*date|due\s*date)[:\s]*({DATE})"),
            1,
            Normalize::Trim,
        ),
        FieldRule::new(
            r"(?i)(?:payment\s*due\s*date|due\s*date)[:\s]*([A-Za-z]{3,}\s+\d{1,2},?\s*\d{4})",
            1,
            Normalize::Trim,
        ),
    ]
});

static LONG_DUE_DATE: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![FieldRule::new(
        r"(?i)payment\s*due\s*date[:\s]+(\d{1,2}\s+[A-Za-z]{3,}\s+\d{4})",
        1,
        Normalize::Trim,
    )]
});

static SHARED_BILLING_CYCLE: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            r"(?i)(?:statement\s*period|billing\s*cycle)[:\s]*([A-Za-z0-9,/ \t-]+to[ \t]+[A-Za-z0-9,/ \t-]+)",
            1,
            Normalize::Trim,
        ),
        FieldRule::new(
            &format!(r"(?i)statement\s*date[:\s]*({DATE})"),
            1,
            Normalize::Trim,
        ),
    ]
});

static LONG_STATEMENT_DATE: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![FieldRule::new(
        r"(?i)statement\s*date[:\s]+(\d{1,2}\s+[A-Za-z]{3,}\s+\d{4})",
        1,
        Normalize::Trim,
    )]
});

/// The rule lists used to find each scalar field for one bank.
#[derive(Debug, Clone, Copy)]
pub struct FieldProfile {
    /// Card last-4 rules.
    pub last_4_digits: &'static [FieldRule],
    /// Total balance rules.
    pub total_balance: &'static [FieldRule],
    /// Payment due date rules.
    pub payment_due_date: &'static [FieldRule],
    /// Billing cycle rules.
    pub billing_cycle: &'static [FieldRule],
}

impl FieldProfile {
    /// The profile used for `bank`.
    #[must_use]
    pub fn for_bank(bank: BankIdentity) -> Self {
        match bank {
            BankIdentity::Hdfc
            | BankIdentity::Idfc
            | BankIdentity::Citi
            | BankIdentity::Unknown => Self {
                last_4_digits: &SHARED_LAST_4,
                total_balance: &SHARED_TOTAL_BALANCE,
                payment_due_date: &SHARED_DUE_DATE,
                billing_cycle: &SHARED_BILLING_CYCLE,
            },
            BankIdentity::Icici => Self {
                last_4_digits: &SHARED_LAST_4,
                total_balance: &SHARED_TOTAL_BALANCE,
                payment_due_date: &LONG_DUE_DATE,
                billing_cycle: &LONG_STATEMENT_DATE,
            },
            BankIdentity::Visa => Self {
                last_4_digits: &MASKED_LAST_4,
                total_balance: &SHARED_TOTAL_BALANCE,
                payment_due_date: &LONG_DUE_DATE,
                billing_cycle: &LONG_STATEMENT_DATE,
            },
        }
    }

    /// Runs every field's rules over `text`. Transactions are left empty.
    #[must_use]
    pub fn extract(&self, text: &str) -> ExtractedData {
        ExtractedData {
            last_4_digits: first_match(self.last_4_digits, text),
            total_balance: first_match(self.total_balance, text),
            payment_due_date: first_match(self.payment_due_date, text),
            billing_cycle: first_match(self.billing_cycle, text),
            transactions: Vec::new(),
        }
    }
}
