//! Spreadsheet (xlsx/xls/ods) statement ingestion. First sheet only.

use std::io::Cursor;
use std::sync::Arc;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use saoke_core::{BusinessRules, ColumnMapping, DefaultRules, ParsedRow};

use crate::error::IngestError;
use crate::grid::parse_cell_grid;

pub struct SpreadsheetIngestor {
    rules: Arc<dyn BusinessRules>,
}

impl Default for SpreadsheetIngestor {
    fn default() -> Self {
        Self {
            rules: Arc::new(DefaultRules::default()),
        }
    }
}

impl SpreadsheetIngestor {
    pub fn new(rules: Arc<dyn BusinessRules>) -> Self {
        Self { rules }
    }

    pub fn parse(
        &self,
        bytes: &[u8],
        mapping: Option<ColumnMapping>,
    ) -> Result<Vec<ParsedRow>, IngestError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| IngestError::UnreadableDocument(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or(IngestError::NoSheets)?
            .map_err(|e| IngestError::UnreadableDocument(e.to_string()))?;

        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(render_cell).collect())
            .collect();
        tracing::debug!(rows = rows.len(), "read spreadsheet rows");

        parse_cell_grid(&rows, mapping, Arc::clone(&self.rules))
    }
}

/// Render spreadsheet cells to the canonical strings the leaf parsers
/// expect: integers without a trailing `.0`, native date cells as
/// `DD/MM/YYYY`.
fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ndt| ndt.format("%d/%m/%Y").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}
