//! Income/expense classification from description keywords and amount sign.

use crate::keywords::{EXPENSE_KEYWORDS, INCOME_KEYWORDS, contains_keyword};
use crate::types::TxnType;

/// Classifies transactions. Income keywords outrank expense keywords and
/// both outrank the amount sign, so "Purchase refund" reads as income even
/// when the bank reports it with a negative amount.
#[derive(Debug, Clone)]
pub struct TypeDetector {
    income_keywords: Vec<String>,
    expense_keywords: Vec<String>,
}

impl Default for TypeDetector {
    fn default() -> Self {
        Self {
            income_keywords: INCOME_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            expense_keywords: EXPENSE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TypeDetector {
    pub fn new(income_keywords: Vec<String>, expense_keywords: Vec<String>) -> Self {
        Self {
            income_keywords,
            expense_keywords,
        }
    }

    /// `amount` is ×10000 fixed point; only its sign matters here.
    pub fn detect(&self, description: &str, amount: i64) -> TxnType {
        let desc = description.to_lowercase();

        if self.income_keywords.iter().any(|k| contains_keyword(&desc, k)) {
            return TxnType::Income;
        }
        if self.expense_keywords.iter().any(|k| contains_keyword(&desc, k)) {
            return TxnType::Expense;
        }
        if amount >= 0 {
            TxnType::Income
        } else {
            TxnType::Expense
        }
    }
}
