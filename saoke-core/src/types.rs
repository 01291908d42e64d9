use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed-point scale for amounts: currency minor units ×10000.
/// All arithmetic downstream uses this representation to avoid float drift.
pub const AMOUNT_SCALE: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A field-level diagnostic attached to a row. Only `Error` severity
/// flips `ParsedRow::is_valid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity,
        }
    }
}

/// Normalized output of the statement ingestors (bank-agnostic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRow {
    /// 1-based position in the source document (header rows included in
    /// the numbering, so diagnostics point at the right line).
    pub row_number: usize,
    pub date: NaiveDate,
    /// Currency minor units ×10000 (see [`AMOUNT_SCALE`]). Negative means
    /// the source notation marked the amount as negative.
    pub amount: i64,
    pub description: String,
    /// Source text before cleaning, kept when cleaning changed it.
    pub original_description: Option<String>,
    pub txn_type: TxnType,
    /// Always 0 here; category resolution happens downstream.
    pub category_id: i64,
    pub reference_num: String,
    pub validation_errors: Vec<ValidationError>,
    pub is_valid: bool,
}

impl ParsedRow {
    /// Attach a diagnostic, flipping validity on `Error` severity.
    pub fn push_error(&mut self, field: &str, message: impl Into<String>, severity: Severity) {
        if severity == Severity::Error {
            self.is_valid = false;
        }
        self.validation_errors
            .push(ValidationError::new(field, message, severity));
    }
}

/// Assignment of raw row cells to semantic transaction fields.
///
/// Either supplied by the caller or inferred from a header row; inference
/// fails (returns `None`) unless date, amount and description all resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date_column: usize,
    pub amount_column: usize,
    pub description_column: usize,
    pub type_column: Option<usize>,
    pub category_column: Option<usize>,
    pub reference_column: Option<usize>,
    /// Day/month order hint for ambiguous dates, e.g. "DD/MM/YYYY".
    pub preferred_date_format: Option<String>,
    /// Explicit amount notation; `None` enables locale auto-detection.
    pub amount_format: Option<AmountFormat>,
    pub currency: String,
}

impl ColumnMapping {
    pub fn new(date_column: usize, amount_column: usize, description_column: usize) -> Self {
        Self {
            date_column,
            amount_column,
            description_column,
            type_column: None,
            category_column: None,
            reference_column: None,
            preferred_date_format: None,
            amount_format: None,
            currency: "VND".to_string(),
        }
    }
}

/// Explicit amount notation, bypassing locale auto-detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountFormat {
    pub decimal_separator: char,
    pub thousands_separator: Option<char>,
    pub currency_symbol: String,
}
