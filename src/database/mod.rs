pub mod chat_store;
pub mod manager;
pub mod models;

pub use chat_store::{ChatStore, MemoryChatStore, PgChatStore, StoreError};
pub use manager::{DatabaseError, DatabaseManager};
