//! Shared ingestion over a grid of cell strings (CSV records, spreadsheet
//! rows, or detected PDF table rows all reduce to this).

use std::sync::Arc;

use saoke_core::{BusinessRules, ColumnMapping, ParsedRow};

use crate::error::IngestError;
use crate::mapping::{infer_mapping, is_header_row};
use crate::row::{RowParser, is_empty_row};

/// Parse a grid of cells into rows. With no explicit mapping the first
/// non-empty row must be a header row we can infer columns from; with one,
/// a leading header row is still skipped when present.
pub fn parse_cell_grid(
    rows: &[Vec<String>],
    mapping: Option<ColumnMapping>,
    rules: Arc<dyn BusinessRules>,
) -> Result<Vec<ParsedRow>, IngestError> {
    let Some(first_index) = rows.iter().position(|r| !is_empty_row(r)) else {
        return Ok(Vec::new());
    };

    let (mapping, data_start) = match mapping {
        Some(mapping) => {
            if is_header_row(&rows[first_index]) {
                (mapping, first_index + 1)
            } else {
                (mapping, first_index)
            }
        }
        None => {
            let inferred =
                infer_mapping(&rows[first_index]).ok_or(IngestError::UnresolvedMapping)?;
            (inferred, first_index + 1)
        }
    };

    let parser = RowParser::for_mapping(&mapping, rules);
    let mut parsed = Vec::new();
    for (index, cells) in rows.iter().enumerate().skip(data_start) {
        if let Some(row) = parser.parse_row(index + 1, cells, &mapping) {
            parsed.push(row);
        }
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use saoke_core::DefaultRules;

    fn rules() -> Arc<dyn BusinessRules> {
        Arc::new(DefaultRules::default())
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_auto_mapping_from_header() {
        let rows = grid(&[
            &["Date", "Amount", "Description"],
            &["15/01/2026", "100,000", "Coffee"],
        ]);
        let parsed = parse_cell_grid(&rows, None, rules()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].row_number, 2);
        assert_eq!(parsed[0].amount, 1_000_000_000);
    }

    #[test]
    fn test_missing_header_without_mapping_fails() {
        let rows = grid(&[&["15/01/2026", "100,000", "Coffee"]]);
        assert!(matches!(
            parse_cell_grid(&rows, None, rules()),
            Err(IngestError::UnresolvedMapping)
        ));
    }

    #[test]
    fn test_explicit_mapping_skips_leading_header() {
        let rows = grid(&[
            &["Ngày", "Số tiền", "Nội dung"],
            &["15/01/2026", "100,000", "Coffee"],
        ]);
        let mapping = ColumnMapping::new(0, 1, 2);
        let parsed = parse_cell_grid(&rows, Some(mapping), rules()).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_leading_blank_rows_ignored() {
        let rows = grid(&[
            &["", "", ""],
            &["Date", "Amount", "Description"],
            &["15/01/2026", "100,000", "Coffee"],
        ]);
        let parsed = parse_cell_grid(&rows, None, rules()).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
