//! Columnar ("vertical") statement fallback.
//!
//! Some banks lay one transaction out as a PDF text column rather than a
//! row. Elements are clustered by x with a wider tolerance than row
//! grouping (to absorb sub-pixel jitter), and each cluster is scanned
//! top-to-bottom for a date, an amount, and description tokens.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use saoke_core::keywords::{
    CREDIT_HEADERS, DEBIT_HEADERS, EXPENSE_KEYWORDS, INCOME_KEYWORDS, contains_keyword,
};
use saoke_core::{
    AmountParser, BusinessRules, DEFAULT_DESCRIPTION, DateParser, DescriptionCleaner, ParsedRow,
    Severity, TxnType,
};

use crate::error::IngestError;
use crate::table::{TableRow, TextElement};

const X_CLUSTER_TOLERANCE: f32 = 5.0;

/// Amounts must carry a thousands separator to qualify; bare numbers are
/// usually running balances or reference counters.
static GROUPED_AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,3}(?:[.,]\d{3})+").unwrap());

/// Cluster elements into one [`TableRow`] per x position, cells ordered
/// top-to-bottom.
pub fn cluster_columns(elements: &[TextElement]) -> Vec<TableRow> {
    let mut sorted: Vec<&TextElement> = elements.iter().collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut clusters: Vec<Vec<&TextElement>> = Vec::new();
    let mut current: Vec<&TextElement> = Vec::new();
    let mut current_x = f32::NAN;

    for element in sorted {
        if current.is_empty() || (element.x - current_x).abs() <= X_CLUSTER_TOLERANCE {
            if current.is_empty() {
                current_x = element.x;
            }
            current.push(element);
        } else {
            clusters.push(std::mem::take(&mut current));
            current.push(element);
            current_x = element.x;
        }
    }
    if !current.is_empty() {
        clusters.push(current);
    }

    clusters
        .into_iter()
        .map(|mut cluster| {
            cluster.sort_by(|a, b| a.y.total_cmp(&b.y));
            TableRow {
                y: cluster.first().map_or(0.0, |e| e.y),
                cells: cluster.iter().map(|e| e.text.clone()).collect(),
                cell_bounds: cluster.iter().map(|_| cluster[0].x).collect(),
            }
        })
        .collect()
}

/// Parse a columnar statement: one transaction per x-cluster.
pub fn parse_vertical(
    elements: &[TextElement],
    currency: &str,
    rules: Arc<dyn BusinessRules>,
) -> Result<Vec<ParsedRow>, IngestError> {
    let date_parser = DateParser::default();
    let amount_parser = AmountParser::default();
    let cleaner = DescriptionCleaner::default();

    let clusters = cluster_columns(elements);
    tracing::debug!(clusters = clusters.len(), "vertical layout clusters");

    let mut parsed = Vec::new();
    for column in &clusters {
        if let Some(row) = parse_column(
            column,
            parsed.len() + 1,
            &date_parser,
            &amount_parser,
            &cleaner,
            currency,
            rules.as_ref(),
        ) {
            parsed.push(row);
        }
    }

    if parsed.is_empty() {
        return Err(IngestError::NoVerticalTransactions);
    }
    Ok(parsed)
}

fn parse_column(
    column: &TableRow,
    row_number: usize,
    date_parser: &DateParser,
    amount_parser: &AmountParser,
    cleaner: &DescriptionCleaner,
    currency: &str,
    rules: &dyn BusinessRules,
) -> Option<ParsedRow> {
    let cells = &column.cells;

    let (date_index, date) = cells
        .iter()
        .enumerate()
        .find_map(|(i, cell)| date_parser.parse(cell).ok().map(|d| (i, d)))?;

    // Only the first separator-grouped amount counts; anything after it is
    // treated as a running balance.
    let (amount_index, amount) = cells.iter().enumerate().find_map(|(i, cell)| {
        if i == date_index || !GROUPED_AMOUNT_RE.is_match(cell) {
            return None;
        }
        amount_parser.parse(cell).ok().map(|a| (i, a))
    })?;

    let debit_index = find_token_cell(cells, DEBIT_HEADERS);
    let credit_index = find_token_cell(cells, CREDIT_HEADERS);

    let description_raw: String = cells
        .iter()
        .enumerate()
        .filter(|(i, cell)| {
            *i != date_index
                && *i != amount_index
                && Some(*i) != debit_index
                && Some(*i) != credit_index
                && cell.chars().count() >= 6
                && cell.chars().any(char::is_alphabetic)
        })
        .map(|(_, cell)| cell.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let description = if description_raw.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        cleaner.clean(&description_raw)
    };

    let (txn_type, direction_unresolved) =
        resolve_direction(cells, amount_index, debit_index, credit_index, amount);

    let mut row = ParsedRow {
        row_number,
        date,
        amount,
        description: description.clone(),
        original_description: (description != description_raw && !description_raw.is_empty())
            .then_some(description_raw),
        txn_type,
        category_id: 0,
        reference_num: String::new(),
        validation_errors: Vec::new(),
        is_valid: true,
    };

    if direction_unresolved {
        // Neither header tokens nor keywords decided; sign is a guess.
        row.push_error(
            "type",
            "debit/credit direction could not be determined; classified by amount sign",
            Severity::Warning,
        );
    }

    for finding in rules.validate(amount, currency, &row.description, date) {
        row.push_error(&finding.field, finding.message, finding.severity);
    }

    Some(row)
}

/// Header-token distance first, keyword evidence second, amount sign last
/// (flagged as low-confidence by the caller).
fn resolve_direction(
    cells: &[String],
    amount_index: usize,
    debit_index: Option<usize>,
    credit_index: Option<usize>,
    amount: i64,
) -> (TxnType, bool) {
    match (debit_index, credit_index) {
        (Some(debit), Some(credit)) => {
            let to_debit = amount_index.abs_diff(debit);
            let to_credit = amount_index.abs_diff(credit);
            if to_debit < to_credit {
                return (TxnType::Expense, false);
            }
            if to_credit < to_debit {
                return (TxnType::Income, false);
            }
        }
        (Some(_), None) => return (TxnType::Expense, false),
        (None, Some(_)) => return (TxnType::Income, false),
        (None, None) => {}
    }

    let joined = cells.join(" ").to_lowercase();
    if INCOME_KEYWORDS.iter().any(|k| contains_keyword(&joined, k)) {
        return (TxnType::Income, false);
    }
    if EXPENSE_KEYWORDS.iter().any(|k| contains_keyword(&joined, k)) {
        return (TxnType::Expense, false);
    }

    let by_sign = if amount >= 0 {
        TxnType::Income
    } else {
        TxnType::Expense
    };
    (by_sign, true)
}

fn find_token_cell(cells: &[String], tokens: &[&str]) -> Option<usize> {
    cells.iter().position(|cell| {
        let lowered = cell.to_lowercase();
        tokens.iter().any(|t| lowered.contains(t))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use saoke_core::DefaultRules;

    fn element(x: f32, y: f32, text: &str) -> TextElement {
        TextElement {
            x,
            y,
            text: text.to_string(),
            font_size: 10.0,
        }
    }

    fn rules() -> Arc<dyn BusinessRules> {
        Arc::new(DefaultRules::default())
    }

    /// One transaction per column: label cells, then date, amount, merchant.
    fn columnar_elements() -> Vec<TextElement> {
        let mut elements = Vec::new();
        for (i, (date, amount, merchant)) in [
            ("15/01/2026", "100,000", "Highlands Coffee"),
            ("16/01/2026", "2,500,000", "Salary January"),
        ]
        .iter()
        .enumerate()
        {
            let x = 100.0 + i as f32 * 200.0;
            elements.push(element(x, 10.0, date));
            elements.push(element(x + 1.0, 30.0, amount));
            // a running balance below the amount must be ignored
            elements.push(element(x - 1.0, 50.0, "99,999,999"));
            elements.push(element(x, 70.0, merchant));
        }
        elements
    }

    #[test]
    fn test_one_transaction_per_cluster() {
        let rows = parse_vertical(&columnar_elements(), "VND", rules()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, 1_000_000_000);
        assert_eq!(rows[0].description, "Highlands Coffee");
        assert_eq!(rows[1].amount, 25_000_000_000);
    }

    #[test]
    fn test_first_grouped_amount_taken_not_balance() {
        let rows = parse_vertical(&columnar_elements(), "VND", rules()).unwrap();
        // 99,999,999 is positioned after the amount and must not win
        assert_eq!(rows[0].amount, 1_000_000_000);
    }

    #[test]
    fn test_keyword_resolves_direction() {
        let rows = parse_vertical(&columnar_elements(), "VND", rules()).unwrap();
        assert_eq!(rows[1].txn_type, TxnType::Income);
        assert!(
            !rows[1]
                .validation_errors
                .iter()
                .any(|e| e.field == "type"),
            "keyword-resolved direction is not low-confidence"
        );
    }

    #[test]
    fn test_keyword_fragment_does_not_resolve_direction() {
        let rows = parse_vertical(&columnar_elements(), "VND", rules()).unwrap();
        // "fee" inside "Coffee" is not expense evidence; the positive sign
        // decides and the guess is flagged.
        assert_eq!(rows[0].txn_type, TxnType::Income);
        assert!(
            rows[0]
                .validation_errors
                .iter()
                .any(|e| e.field == "type" && e.severity == Severity::Warning)
        );
    }

    #[test]
    fn test_unresolved_direction_flagged() {
        let elements = vec![
            element(100.0, 10.0, "15/01/2026"),
            element(100.0, 30.0, "100,000"),
            element(100.0, 50.0, "Bookshop Corner"),
        ];
        let rows = parse_vertical(&elements, "VND", rules()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(
            rows[0]
                .validation_errors
                .iter()
                .any(|e| e.field == "type" && e.severity == Severity::Warning)
        );
        // positive amount, so the sign guess says income
        assert_eq!(rows[0].txn_type, TxnType::Income);
        assert!(rows[0].is_valid, "warning must not invalidate the row");
    }

    #[test]
    fn test_debit_header_distance_resolves_direction() {
        let elements = vec![
            element(100.0, 5.0, "Ghi nợ"),
            element(100.0, 10.0, "100,000"),
            element(100.0, 20.0, "15/01/2026"),
            element(100.0, 40.0, "Bookshop Corner"),
            element(100.0, 60.0, "Ghi có"),
        ];
        let rows = parse_vertical(&elements, "VND", rules()).unwrap();
        assert_eq!(rows[0].txn_type, TxnType::Expense);
    }

    #[test]
    fn test_no_usable_columns_errors() {
        let elements = vec![
            element(100.0, 10.0, "just text"),
            element(100.0, 30.0, "more text"),
        ];
        assert!(matches!(
            parse_vertical(&elements, "VND", rules()),
            Err(IngestError::NoVerticalTransactions)
        ));
    }
}
