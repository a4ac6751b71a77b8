//! Declarative pattern rules and the first-match loop that evaluates them.

use regex::Regex;

/// Matches a numeric date such as `12-05-2024` or `1/2/24`.
pub const DATE: &str = r"\d{1,2}[-/]\d{1,2}[-/]\d{2,4}";

/// Matches an amount with a mandatory two-digit fraction, optionally
/// prefixed with a rupee sign and carrying thousands separators.
pub const AMOUNT: &str = r"₹?\s*\d[\d,]*\.\d{2}";

/// Post-processing applied to a rule's capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    /// Surrounding whitespace is removed.
    Trim,
    /// Non-digits are stripped and the last four digits kept; fewer than
    /// four digits rejects the match.
    LastFourDigits,
}

impl Normalize {
    fn apply(self, captured: &str) -> Option<String> {
        match self {
            Self::Trim => Some(captured.trim().to_string()),
            Self::LastFourDigits => {
                let digits: Vec<char> = captured.chars().filter(char::is_ascii_digit).collect();
                (digits.len() >= 4).then(|| digits[digits.len() - 4..].iter().collect())
            }
        }
    }
}

/// One way of finding a field: a pattern, which capture group holds the
/// value, and how to clean it.
///
/// A decisive rule ends the search whenever its pattern matches, even when
/// normalization rejects the capture.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pattern: Regex,
    group: usize,
    normalize: Normalize,
    decisive: bool,
}

impl FieldRule {
    /// Compiles a rule.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex. Rules are built from
    /// literals in this crate, so this is a programming error.
    #[must_use]
    pub fn new(pattern: &str, group: usize, normalize: Normalize) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("valid regex"),
            group,
            normalize,
            decisive: false,
        }
    }

    /// Marks the rule as decisive: once its pattern matches, later rules
    /// are not tried.
    #[must_use]
    pub const fn decisive(mut self) -> Self {
        self.decisive = true;
        self
    }

    fn apply(&self, text: &str) -> RuleOutcome {
        let Some(captures) = self.pattern.captures(text) else {
            return RuleOutcome::NoMatch;
        };
        let value = captures
            .get(self.group)
            .and_then(|captured| self.normalize.apply(captured.as_str()));
        match value {
            Some(value) => RuleOutcome::Found(value),
            None if self.decisive => RuleOutcome::Absent,
            None => RuleOutcome::NoMatch,
        }
    }

    /// Applies the rule to `text`, returning the normalized capture of the
    /// first match.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<String> {
        match self.apply(text) {
            RuleOutcome::Found(value) => Some(value),
            RuleOutcome::Absent | RuleOutcome::NoMatch => None,
        }
    }
}

enum RuleOutcome {
    Found(String),
    Absent,
    NoMatch,
}

/// Evaluates `rules` in order and returns the first value produced.
///
/// A decisive rule whose capture is rejected stops the search with `None`.
#[must_use]
pub fn first_match(rules: &[FieldRule], text: &str) -> Option<String> {
    for rule in rules {
        match rule.apply(text) {
            RuleOutcome::Found(value) => return Some(value),
            RuleOutcome::Absent => return None,
            RuleOutcome::NoMatch => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_four_rejects_short_digit_runs() {
        assert_eq!(
            Normalize::LastFourDigits.apply("XXXX-XXXX-XXXX-1234"),
            Some("1234".to_string())
        );
        assert_eq!(Normalize::LastFourDigits.apply("XX 12"), None);
    }

    #[test]
    fn first_match_falls_through_rejected_captures() {
        let rules = [
            FieldRule::new(r"card no[:\s]*([0-9X ]{4,})", 1, Normalize::LastFourDigits),
            FieldRule::new(r"(\d{4})", 1, Normalize::Trim),
        ];
        assert_eq!(
            first_match(&rules, "card no: XXXX 12 ref 9876"),
            Some("9876".to_string())
        );
        assert_eq!(first_match(&rules, "nothing here"), None);
    }

    #[test]
    fn decisive_rule_stops_on_rejected_capture() {
        let rules = [
            FieldRule::new(r"card no[:\s]*([0-9X ]{4,})", 1, Normalize::LastFourDigits)
                .decisive(),
            FieldRule::new(r"(\d{4})", 1, Normalize::Trim),
        ];
        assert_eq!(first_match(&rules, "card no: XXXX 12 ref 9876"), None);
        assert_eq!(
            first_match(&rules, "card no: XXXX 5678 ref 9876"),
            Some("5678".to_string())
        );
        assert_eq!(first_match(&rules, "ref 9876"), Some("9876".to_string()));
    }

    #[test]
    fn amount_requires_two_decimals() {
        let re = Regex::new(&format!("^(?:{AMOUNT})$")).unwrap();
        assert!(re.is_match("1,234.56"));
        assert!(re.is_match("₹ 12,345.67"));
        assert!(!re.is_match("1,234"));
        assert!(!re.is_match("12.5"));
    }
}
