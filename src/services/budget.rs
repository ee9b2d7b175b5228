use serde_json::Value;

use crate::client::{ApiClient, ClientError};
use crate::models::{ExpenseDeletion, NewExpense};

use super::log_failure;

/// Budget endpoints. Payloads are returned exactly as the backend sent them.
#[derive(Debug, Clone)]
pub struct BudgetService {
    client: ApiClient,
}

impl BudgetService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// GET /budget
    pub async fn get_budget(&self) -> Result<Value, ClientError> {
        log_failure("getBudget", self.client.get(&["budget"]).await)
    }

    /// POST /budget/expense - record a new expense. Non-finite amounts are
    /// refused locally and never reach the backend.
    pub async fn update_transactions(
        &self,
        category: &str,
        description: &str,
        amount: f64,
    ) -> Result<Value, ClientError> {
        let result = match NewExpense::new(category, description, amount) {
            Ok(body) => self.client.post(&["budget", "expense"], &body).await,
            Err(e) => Err(ClientError::InvalidRequest(e.to_string())),
        };
        log_failure("updateTransactions", result)
    }

    /// DELETE /budget/expense/{transaction_id} with the category lowercased
    pub async fn delete_transaction(&self, transaction_id: &str, category: &str) -> Result<Value, ClientError> {
        let body = ExpenseDeletion::new(category);
        log_failure(
            "deleteTransaction",
            self.client
                .delete(&["budget", "expense", transaction_id], &body)
                .await,
        )
    }
}
