//! saoke-core: canonical transaction model and the leaf parsers
//! (date/amount/description/type) shared by every statement ingestor.

pub mod amount;
pub mod date;
pub mod description;
pub mod keywords;
pub mod txn_type;
pub mod types;
pub mod validate;

pub use amount::AmountParser;
pub use date::DateParser;
pub use description::{DEFAULT_DESCRIPTION, DescriptionCleaner};
pub use txn_type::TypeDetector;
pub use types::{
    AMOUNT_SCALE, AmountFormat, ColumnMapping, ParsedRow, Severity, TxnType, ValidationError,
};
pub use validate::{BusinessRules, DefaultRules};
