//! Column-mapping inference from a header row.

use saoke_core::ColumnMapping;
use saoke_core::keywords::{
    AMOUNT_HEADERS, CATEGORY_HEADERS, DATE_HEADERS, DESCRIPTION_HEADERS, REFERENCE_HEADERS,
    TABLE_HEADER_KEYWORDS, TYPE_HEADERS,
};

/// True when a row reads like a column-header row (2+ header keywords).
pub fn is_header_row(cells: &[String]) -> bool {
    let joined = cells.join(" ").to_lowercase();
    let score = TABLE_HEADER_KEYWORDS
        .iter()
        .filter(|k| joined.contains(&k.to_lowercase()))
        .count();
    score >= 2
}

/// Infer a mapping from bilingual header-cell keywords. Returns `None`
/// unless date, amount and description all resolve, each to its own column.
pub fn infer_mapping(header_cells: &[String]) -> Option<ColumnMapping> {
    let lowered: Vec<String> = header_cells
        .iter()
        .map(|c| c.trim().to_lowercase())
        .collect();

    let mut taken = vec![false; lowered.len()];
    let mut find = |keywords: &[&str]| -> Option<usize> {
        let index = lowered
            .iter()
            .enumerate()
            .find(|(i, cell)| {
                !taken[*i] && !cell.is_empty() && keywords.iter().any(|k| cell.contains(k))
            })
            .map(|(i, _)| i)?;
        taken[index] = true;
        Some(index)
    };

    let date_column = find(DATE_HEADERS)?;
    let amount_column = find(AMOUNT_HEADERS)?;
    let description_column = find(DESCRIPTION_HEADERS)?;

    let mut mapping = ColumnMapping::new(date_column, amount_column, description_column);
    mapping.type_column = find(TYPE_HEADERS);
    mapping.category_column = find(CATEGORY_HEADERS);
    mapping.reference_column = find(REFERENCE_HEADERS);
    Some(mapping)
}
