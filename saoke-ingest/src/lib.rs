//! saoke-ingest: statement ingestion — table reconstruction from positioned
//! PDF text, column-mapping inference, and the CSV/spreadsheet/PDF
//! orchestrators producing validated [`saoke_core::ParsedRow`]s.

pub mod csv_ingest;
pub mod error;
pub mod grid;
pub mod mapping;
pub mod pdf;
pub mod pdf_source;
pub mod row;
pub mod sheet;
pub mod table;
pub mod vertical;

pub use csv_ingest::CsvIngestor;
pub use error::IngestError;
pub use mapping::infer_mapping;
pub use pdf::PdfIngestor;
pub use pdf_source::{LopdfTextSource, PdfTextSource};
pub use row::RowParser;
pub use sheet::SpreadsheetIngestor;
pub use table::{TableConfig, TableDetector, TableRow, TextElement};
