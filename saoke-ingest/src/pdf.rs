//! PDF statement ingestion.
//!
//! The horizontal (table) layout is tried first; when it fails structurally
//! or yields zero transactions, the columnar layout takes over. Only when
//! both fail is a combined error surfaced.

use std::sync::Arc;

use saoke_core::{BusinessRules, ColumnMapping, DefaultRules, ParsedRow};

use crate::error::IngestError;
use crate::mapping;
use crate::pdf_source::{LopdfTextSource, PdfTextSource};
use crate::row::RowParser;
use crate::table::{TableConfig, TableDetector, TextElement};
use crate::vertical::parse_vertical;

pub struct PdfIngestor {
    detector: TableDetector,
    source: Box<dyn PdfTextSource>,
    rules: Arc<dyn BusinessRules>,
    currency: String,
}

impl Default for PdfIngestor {
    fn default() -> Self {
        Self {
            detector: TableDetector::default(),
            source: Box::new(LopdfTextSource),
            rules: Arc::new(DefaultRules::default()),
            currency: "VND".to_string(),
        }
    }
}

impl PdfIngestor {
    pub fn new(
        config: TableConfig,
        source: Box<dyn PdfTextSource>,
        rules: Arc<dyn BusinessRules>,
        currency: &str,
    ) -> Self {
        Self {
            detector: TableDetector::new(config),
            source,
            rules,
            currency: currency.to_string(),
        }
    }

    pub fn parse(
        &self,
        bytes: &[u8],
        mapping: Option<ColumnMapping>,
    ) -> Result<Vec<ParsedRow>, IngestError> {
        let elements = self.source.extract(bytes)?;
        self.parse_elements(&elements, mapping)
    }

    /// Entry point for synthetic fixtures: positioned text in, rows out.
    pub fn parse_elements(
        &self,
        elements: &[TextElement],
        mapping: Option<ColumnMapping>,
    ) -> Result<Vec<ParsedRow>, IngestError> {
        let horizontal_failure = match self.parse_horizontal(elements, mapping) {
            Ok(rows) if !rows.is_empty() => return Ok(rows),
            Ok(_) => "table layout produced no transactions".to_string(),
            Err(e) => e.to_string(),
        };

        tracing::warn!(
            reason = %horizontal_failure,
            "falling back to columnar layout"
        );
        parse_vertical(elements, &self.currency, Arc::clone(&self.rules)).map_err(|vertical| {
            IngestError::AllPdfLayoutsFailed {
                horizontal: horizontal_failure,
                vertical: vertical.to_string(),
            }
        })
    }

    fn parse_horizontal(
        &self,
        elements: &[TextElement],
        mapping: Option<ColumnMapping>,
    ) -> Result<Vec<ParsedRow>, IngestError> {
        let table_rows = self.detector.detect(elements)?;
        let header_index = self.detector.find_header_row(&table_rows);

        let mapping = match mapping {
            Some(m) => m,
            None => mapping::infer_mapping(&table_rows[header_index].cells)
                .ok_or(IngestError::UnresolvedMapping)?,
        };

        // Rows keep their position in the detected table so row numbers in
        // diagnostics survive the header skip.
        let parser = RowParser::for_mapping(&mapping, Arc::clone(&self.rules));
        let mut parsed = Vec::new();
        for (index, table_row) in table_rows.iter().enumerate().skip(header_index + 1) {
            if let Some(row) = parser.parse_row(index + 1, &table_row.cells, &mapping) {
                parsed.push(row);
            }
        }
        Ok(parsed)
    }
}
