use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpenseError {
    #[error("amount must be a finite number, got {0}")]
    NonFiniteAmount(f64),
}

/// Body of `POST /budget/expense`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub category: String,
    pub description: String,
    pub amount: f64,
}

impl NewExpense {
    /// Amounts must be finite; JSON cannot carry NaN or infinity
    pub fn new(category: &str, description: &str, amount: f64) -> Result<Self, ExpenseError> {
        if !amount.is_finite() {
            return Err(ExpenseError::NonFiniteAmount(amount));
        }
        Ok(Self {
            category: category.to_string(),
            description: description.to_string(),
            amount,
        })
    }
}

/// Body of `DELETE /budget/expense/{transactionId}`.
/// The backend matches categories case-insensitively against lowercase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDeletion {
    pub category: String,
}

impl ExpenseDeletion {
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_lowercase(),
        }
    }
}

/// Body of `POST /badges/names`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeQuery {
    pub badge_names: Vec<String>,
}
