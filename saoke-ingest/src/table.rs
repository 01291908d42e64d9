//! Tabular structure reconstruction from positioned PDF text.
//!
//! Elements are grouped into rows by y proximity, column boundaries are
//! found from x positions that recur across rows, and each element is then
//! assigned to its nearest boundary to form cells.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use saoke_core::keywords::TABLE_HEADER_KEYWORDS;

use crate::error::IngestError;

/// Maximum distance (in page units) between an element and the column
/// boundary it is assigned to.
const MAX_BOUNDARY_DISTANCE: f32 = 50.0;

/// One positioned glyph run extracted from a PDF page. `y` is normalized so
/// increasing y means further down the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub font_size: f32,
}

/// A reconstructed logical row: `cells[i]` holds the text aligned to the
/// i-th detected column boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub y: f32,
    pub cells: Vec<String>,
    pub cell_bounds: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct TableConfig {
    pub y_tolerance: f32,
    pub min_columns: usize,
    pub min_rows: usize,
    pub header_keywords: Vec<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            y_tolerance: 2.0,
            min_columns: 3,
            min_rows: 5,
            header_keywords: TABLE_HEADER_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableConfig,
}

impl TableDetector {
    pub fn new(config: TableConfig) -> Self {
        Self { config }
    }

    /// Reconstruct table rows from raw positioned text.
    pub fn detect(&self, elements: &[TextElement]) -> Result<Vec<TableRow>, IngestError> {
        let grouped = self.group_rows(elements);
        if grouped.len() < self.config.min_rows {
            return Err(IngestError::InsufficientRows {
                found: grouped.len(),
                required: self.config.min_rows,
            });
        }

        let boundaries = self.detect_column_boundaries(&grouped);
        if boundaries.len() < self.config.min_columns {
            return Err(IngestError::InsufficientColumns {
                found: boundaries.len(),
                required: self.config.min_columns,
            });
        }
        tracing::debug!(
            rows = grouped.len(),
            columns = boundaries.len(),
            "table structure detected"
        );

        Ok(grouped
            .into_iter()
            .map(|row| align_cells(&row, &boundaries))
            .collect())
    }

    /// Score rows by bilingual header-keyword hits; a best score of 2+ wins,
    /// otherwise fall back to the row with the most non-empty cells.
    pub fn find_header_row(&self, rows: &[TableRow]) -> usize {
        let mut best_index = 0;
        let mut best_score = 0;
        for (i, row) in rows.iter().enumerate() {
            let joined = row.cells.join(" ").to_lowercase();
            let score = self
                .config
                .header_keywords
                .iter()
                .filter(|k| joined.contains(k.to_lowercase().as_str()))
                .count();
            if score > best_score {
                best_score = score;
                best_index = i;
            }
        }
        if best_score >= 2 {
            return best_index;
        }

        rows.iter()
            .enumerate()
            .max_by_key(|(_, row)| row.cells.iter().filter(|c| !c.is_empty()).count())
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Walk elements in y order, starting a new row whenever the y gap
    /// exceeds the tolerance; each row is sorted left-to-right.
    fn group_rows<'a>(&self, elements: &'a [TextElement]) -> Vec<Vec<&'a TextElement>> {
        let mut sorted: Vec<&TextElement> = elements.iter().collect();
        sorted.sort_by(|a, b| a.y.total_cmp(&b.y));

        let mut rows: Vec<Vec<&TextElement>> = Vec::new();
        let mut current: Vec<&TextElement> = Vec::new();
        let mut current_y = f32::NAN;

        for element in sorted {
            if current.is_empty() || (element.y - current_y).abs() <= self.config.y_tolerance {
                if current.is_empty() {
                    current_y = element.y;
                }
                current.push(element);
            } else {
                current.sort_by(|a, b| a.x.total_cmp(&b.x));
                rows.push(std::mem::take(&mut current));
                current.push(element);
                current_y = element.y;
            }
        }
        if !current.is_empty() {
            current.sort_by(|a, b| a.x.total_cmp(&b.x));
            rows.push(current);
        }
        rows
    }

    /// Round x to the nearest 0.5 and keep the buckets that recur in at
    /// least a quarter of the rows.
    fn detect_column_boundaries(&self, rows: &[Vec<&TextElement>]) -> Vec<f32> {
        let mut row_counts: BTreeMap<i64, usize> = BTreeMap::new();
        for row in rows {
            let buckets: HashSet<i64> = row.iter().map(|e| half_unit_bucket(e.x)).collect();
            for bucket in buckets {
                *row_counts.entry(bucket).or_default() += 1;
            }
        }

        let required = (rows.len() as f32 / 4.0).max(1.0);
        row_counts
            .into_iter()
            .filter(|(_, count)| *count as f32 >= required)
            .map(|(bucket, _)| bucket as f32 / 2.0)
            .collect()
    }
}

fn half_unit_bucket(x: f32) -> i64 {
    (x * 2.0).round() as i64
}

/// Assign each element to its nearest boundary (within range), joining text
/// that lands in the same column in left-to-right order.
fn align_cells(row: &[&TextElement], boundaries: &[f32]) -> TableRow {
    let mut cells = vec![String::new(); boundaries.len()];
    for element in row {
        let nearest = boundaries
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (element.x - **a).abs().total_cmp(&(element.x - **b).abs())
            })
            .map(|(i, b)| (i, (element.x - *b).abs()));
        if let Some((index, distance)) = nearest {
            if distance <= MAX_BOUNDARY_DISTANCE {
                if !cells[index].is_empty() {
                    cells[index].push(' ');
                }
                cells[index].push_str(element.text.trim());
            }
        }
    }

    TableRow {
        y: row.first().map_or(0.0, |e| e.y),
        cells,
        cell_bounds: boundaries.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(x: f32, y: f32, text: &str) -> TextElement {
        TextElement {
            x,
            y,
            text: text.to_string(),
            font_size: 10.0,
        }
    }

    fn grid_elements() -> Vec<TextElement> {
        let mut elements = Vec::new();
        let headers = ["Date", "Amount", "Description"];
        for (col, header) in headers.iter().enumerate() {
            elements.push(element(20.0 + col as f32 * 150.0, 10.0, header));
        }
        for row in 0..6 {
            let y = 30.0 + row as f32 * 15.0;
            elements.push(element(20.0, y, "01/01/2026"));
            elements.push(element(170.0, y, "100,000"));
            elements.push(element(320.0, y, "Coffee"));
        }
        elements
    }

    #[test]
    fn test_detects_three_columns_and_seven_rows() {
        let detector = TableDetector::default();
        let rows = detector.detect(&grid_elements()).unwrap();
        assert_eq!(rows.len(), 7);
        for row in &rows {
            assert_eq!(row.cells.len(), 3);
        }
        assert_eq!(rows[1].cells, vec!["01/01/2026", "100,000", "Coffee"]);
    }

    #[test]
    fn test_header_row_found_by_keywords() {
        let detector = TableDetector::default();
        let rows = detector.detect(&grid_elements()).unwrap();
        assert_eq!(detector.find_header_row(&rows), 0);
    }

    #[test]
    fn test_header_fallback_most_filled_row() {
        let detector = TableDetector::default();
        let rows = vec![
            TableRow {
                y: 0.0,
                cells: vec!["x".into(), String::new(), String::new()],
                cell_bounds: vec![],
            },
            TableRow {
                y: 10.0,
                cells: vec!["a".into(), "b".into(), "c".into()],
                cell_bounds: vec![],
            },
        ];
        assert_eq!(detector.find_header_row(&rows), 1);
    }

    #[test]
    fn test_insufficient_rows() {
        let detector = TableDetector::default();
        let elements = vec![element(10.0, 10.0, "a"), element(10.0, 40.0, "b")];
        assert!(matches!(
            detector.detect(&elements),
            Err(IngestError::InsufficientRows { found: 2, .. })
        ));
    }

    #[test]
    fn test_insufficient_columns() {
        let detector = TableDetector::default();
        // 6 rows but only one recurring x position
        let elements: Vec<TextElement> = (0..6)
            .map(|i| element(10.0, i as f32 * 20.0, "only"))
            .collect();
        assert!(matches!(
            detector.detect(&elements),
            Err(IngestError::InsufficientColumns { .. })
        ));
    }

    #[test]
    fn test_jittered_y_grouped_into_one_row() {
        let detector = TableDetector::default();
        let mut elements = grid_elements();
        // within the 2.0 tolerance of row y=30
        elements.push(element(170.5, 31.2, "extra"));
        let rows = detector.detect(&elements).unwrap();
        assert_eq!(rows.len(), 7);
        assert!(rows[1].cells[1].contains("extra"));
    }

    #[test]
    fn test_far_elements_rejected() {
        let detector = TableDetector::default();
        let mut elements = grid_elements();
        // 180 units away from every boundary; must not land in any cell
        elements.push(element(500.0, 30.0, "stray"));
        let rows = detector.detect(&elements).unwrap();
        assert!(rows.iter().all(|r| !r.cells.iter().any(|c| c.contains("stray"))));
    }
}
