//! Structural failure taxonomy. Row-level problems never surface here; they
//! become `ValidationError`s on the affected row instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read document: {0}")]
    UnreadableDocument(String),

    #[error("spreadsheet contains no sheets; re-export the statement as CSV")]
    NoSheets,

    #[error(
        "no text could be extracted from the PDF (scanned/image PDFs are not supported); \
         re-export the statement as CSV"
    )]
    NoExtractableText,

    #[error(
        "table detection found {found} rows but at least {required} are needed; \
         re-export the statement as CSV"
    )]
    InsufficientRows { found: usize, required: usize },

    #[error(
        "table detection found {found} column boundaries but at least {required} are needed; \
         re-export the statement as CSV"
    )]
    InsufficientColumns { found: usize, required: usize },

    #[error(
        "could not resolve date, amount and description columns from the header row; \
         supply an explicit column mapping"
    )]
    UnresolvedMapping,

    #[error("no transactions recognized in the columnar layout")]
    NoVerticalTransactions,

    #[error("PDF parsing failed on both layouts (table: {horizontal}; columnar: {vertical})")]
    AllPdfLayoutsFailed {
        horizontal: String,
        vertical: String,
    },

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}
