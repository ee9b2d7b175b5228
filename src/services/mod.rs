pub mod budget;
pub mod chat;
pub mod user;

pub use budget::BudgetService;
pub use chat::ChatService;
pub use user::UserService;

use crate::client::ClientError;

/// Log a failed call and hand the same error back to the caller.
/// Services never retry and never turn a failure into an empty success.
pub(crate) fn log_failure<T>(operation: &str, result: Result<T, ClientError>) -> Result<T, ClientError> {
    if let Err(e) = &result {
        tracing::error!("{} failed: {}", operation, e);
    }
    result
}
