//! The row-level parse algorithm shared by all three format ingestors.

use std::sync::Arc;

use chrono::NaiveDate;

use saoke_core::keywords::SUMMARY_ROW_KEYWORDS;
use saoke_core::{
    AmountParser, BusinessRules, ColumnMapping, DEFAULT_DESCRIPTION, DateParser, DefaultRules,
    DescriptionCleaner, ParsedRow, Severity, TxnType, TypeDetector,
};

/// True when every cell is blank.
pub fn is_empty_row(cells: &[String]) -> bool {
    cells.iter().all(|c| c.trim().is_empty())
}

/// True when the row is a totals/balance line rather than a transaction.
pub fn is_summary_row(cells: &[String]) -> bool {
    let joined = cells.join(" ").to_lowercase();
    SUMMARY_ROW_KEYWORDS.iter().any(|k| joined.contains(k))
}

/// Drives the leaf parsers over one row of cells. Configured per mapping,
/// then shared freely across rows (all parsers are immutable).
pub struct RowParser {
    date: DateParser,
    amount: AmountParser,
    cleaner: DescriptionCleaner,
    detector: TypeDetector,
    rules: Arc<dyn BusinessRules>,
}

impl RowParser {
    pub fn for_mapping(mapping: &ColumnMapping, rules: Arc<dyn BusinessRules>) -> Self {
        Self {
            date: DateParser::new(
                mapping.preferred_date_format.as_deref(),
                chrono_tz::Asia::Ho_Chi_Minh,
            ),
            amount: AmountParser::new(mapping.amount_format.clone()),
            cleaner: DescriptionCleaner::default(),
            detector: TypeDetector::default(),
            rules,
        }
    }

    pub fn with_defaults(mapping: &ColumnMapping) -> Self {
        Self::for_mapping(mapping, Arc::new(DefaultRules::default()))
    }

    /// Parse one data row. Returns `None` for empty and summary rows, which
    /// are filtered rather than reported.
    pub fn parse_row(
        &self,
        row_number: usize,
        cells: &[String],
        mapping: &ColumnMapping,
    ) -> Option<ParsedRow> {
        if is_empty_row(cells) || is_summary_row(cells) {
            return None;
        }

        let cell = |index: usize| cells.get(index).map(String::as_str).unwrap_or("").trim();

        let mut row = ParsedRow {
            row_number,
            date: NaiveDate::default(),
            amount: 0,
            description: String::new(),
            original_description: None,
            txn_type: TxnType::Expense,
            category_id: 0,
            reference_num: String::new(),
            validation_errors: Vec::new(),
            is_valid: true,
        };

        let date = match self.date.parse(cell(mapping.date_column)) {
            Ok(d) => {
                row.date = d;
                Some(d)
            }
            Err(e) => {
                row.push_error("date", e.to_string(), Severity::Error);
                None
            }
        };

        let amount = match self.amount.parse(cell(mapping.amount_column)) {
            Ok(a) => {
                row.amount = a;
                Some(a)
            }
            Err(e) => {
                row.push_error("amount", e.to_string(), Severity::Error);
                None
            }
        };

        let raw_description = cell(mapping.description_column);
        if raw_description.is_empty() {
            row.description = DEFAULT_DESCRIPTION.to_string();
            row.push_error(
                "description",
                "empty description defaulted",
                Severity::Info,
            );
        } else {
            row.description = self.cleaner.clean(raw_description);
            if row.description != raw_description {
                row.original_description = Some(raw_description.to_string());
            }
        }

        // The type cell, when mapped, contributes keywords alongside the
        // cleaned description; income keywords still win.
        let mut type_input = row.description.clone();
        if let Some(type_column) = mapping.type_column {
            let type_cell = cell(type_column);
            if !type_cell.is_empty() {
                type_input.push(' ');
                type_input.push_str(type_cell);
            }
        }
        row.txn_type = self.detector.detect(&type_input, row.amount);

        if let Some(reference_column) = mapping.reference_column {
            row.reference_num = cell(reference_column).to_string();
        }
        // Category cells are carried as a placeholder id; resolution against
        // the user's category table happens downstream.
        row.category_id = 0;

        if let (Some(date), Some(amount)) = (date, amount) {
            for finding in self
                .rules
                .validate(amount, &mapping.currency, &row.description, date)
            {
                row.push_error(&finding.field, finding.message, finding.severity);
            }
        }

        Some(row)
    }
}
