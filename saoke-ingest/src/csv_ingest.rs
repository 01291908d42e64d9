//! CSV statement ingestion.

use std::sync::Arc;

use saoke_core::{BusinessRules, ColumnMapping, DefaultRules, ParsedRow};

use crate::error::IngestError;
use crate::grid::parse_cell_grid;

pub struct CsvIngestor {
    rules: Arc<dyn BusinessRules>,
}

impl Default for CsvIngestor {
    fn default() -> Self {
        Self {
            rules: Arc::new(DefaultRules::default()),
        }
    }
}

impl CsvIngestor {
    pub fn new(rules: Arc<dyn BusinessRules>) -> Self {
        Self { rules }
    }

    /// Parse raw CSV bytes. `mapping` of `None` infers columns from the
    /// header row and errors if that fails.
    pub fn parse(
        &self,
        bytes: &[u8],
        mapping: Option<ColumnMapping>,
    ) -> Result<Vec<ParsedRow>, IngestError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_reader(bytes);

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }
        tracing::debug!(rows = rows.len(), "read csv records");

        parse_cell_grid(&rows, mapping, Arc::clone(&self.rules))
    }
}
