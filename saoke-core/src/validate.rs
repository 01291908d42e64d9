//! Business-rule validation of parsed fields.
//!
//! The ingestors treat this as an opaque collaborator contract; swap in a
//! custom implementation to change bookkeeping policy.

use chrono::{Months, NaiveDate, Utc};

use crate::types::{AMOUNT_SCALE, Severity, ValidationError};

/// Row-level business rules applied after field parsing succeeds. Findings
/// attach to the row without overriding parser-level errors.
pub trait BusinessRules: Send + Sync {
    fn validate(
        &self,
        amount: i64,
        currency: &str,
        description: &str,
        date: NaiveDate,
    ) -> Vec<ValidationError>;
}

/// Default rules: zero amounts and one-character descriptions are errors;
/// very large amounts and year-old dates are advisory.
#[derive(Debug, Clone)]
pub struct DefaultRules {
    /// ×10000 fixed point, compared against the absolute amount.
    pub large_amount_threshold: i64,
}

impl Default for DefaultRules {
    fn default() -> Self {
        Self {
            // 1 billion currency units
            large_amount_threshold: 1_000_000_000 * AMOUNT_SCALE,
        }
    }
}

impl BusinessRules for DefaultRules {
    fn validate(
        &self,
        amount: i64,
        _currency: &str,
        description: &str,
        date: NaiveDate,
    ) -> Vec<ValidationError> {
        let mut findings = Vec::new();

        if amount == 0 {
            findings.push(ValidationError::new(
                "amount",
                "amount is zero",
                Severity::Error,
            ));
        } else if amount.saturating_abs() > self.large_amount_threshold {
            findings.push(ValidationError::new(
                "amount",
                "amount is unusually large; verify against the source document",
                Severity::Warning,
            ));
        }

        // Month arithmetic clamps Feb 29 instead of failing on it.
        let one_year_ago = Utc::now()
            .date_naive()
            .checked_sub_months(Months::new(12))
            .unwrap_or(NaiveDate::MIN);
        if date < one_year_ago {
            findings.push(ValidationError::new(
                "date",
                "date is more than one year old",
                Severity::Warning,
            ));
        }

        if description.chars().count() < 2 {
            findings.push(ValidationError::new(
                "description",
                "description is too short",
                Severity::Error,
            ));
        }

        findings
    }
}
