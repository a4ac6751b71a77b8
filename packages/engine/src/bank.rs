//! Issuer identification from keyword presence.
//!
//! The rule order is significant: the first rule whose keyword groups are
//! all satisfied wins. `citi` also matches inside words such as `citizen`, and
//! a CITI-branded VISA card resolves to CITI.

use card_parser_statement_models::BankIdentity;

/// A bank and the keyword groups that identify it. Every group must have
/// at least one keyword present in the lower-cased text.
struct BankRule {
    bank: BankIdentity,
    groups: &'static [&'static [&'static str]],
}

const RULES: &[BankRule] = &[
    BankRule {
        bank: BankIdentity::Hdfc,
        groups: &[&["hdfc", "hdfcbank"]],
    },
    BankRule {
        bank: BankIdentity::Icici,
        groups: &[&["icici", "icicibank"]],
    },
    BankRule {
        bank: BankIdentity::Idfc,
        groups: &[&["idfc", "idfc first"]],
    },
    BankRule {
        bank: BankIdentity::Citi,
        groups: &[&["citi"]],
    },
    BankRule {
        bank: BankIdentity::Visa,
        groups: &[&["visa"], &["card", "statement"]],
    },
];

/// Classifies the issuing bank of a statement.
#[must_use]
pub fn identify(text: &str) -> BankIdentity {
    let lower = text.to_lowercase();

    RULES
        .iter()
        .find(|rule| {
            rule.groups
                .iter()
                .all(|group| group.iter().any(|keyword| lower.contains(keyword)))
        })
        .map_or(BankIdentity::Unknown, |rule| rule.bank)
}
