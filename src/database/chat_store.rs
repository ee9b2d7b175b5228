//! Persistence seam for chat documents.
//!
//! Documents reach a store only after `ChatDocument::create` or
//! `ConversationTurn::from_draft` accepted them; stores never see drafts.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::chat::ChatRow;
use crate::models::chat::{ChatDocument, ConversationTurn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Stored document is malformed: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(DatabaseError::Sqlx(err))
    }
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), StoreError>;

    /// Persist a new document. One session id per user.
    async fn insert(&self, doc: ChatDocument) -> Result<ChatDocument, StoreError>;

    async fn find_by_session(&self, user_id: Uuid, session_id: &str) -> Result<Option<ChatDocument>, StoreError>;

    /// Most recently updated first
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ChatDocument>, StoreError>;

    /// Append at the end of the conversation and bump `updated_at`
    async fn append_turn(
        &self,
        user_id: Uuid,
        session_id: &str,
        turn: ConversationTurn,
        now: DateTime<Utc>,
    ) -> Result<ChatDocument, StoreError>;
}

fn session_not_found(session_id: &str) -> StoreError {
    StoreError::NotFound(format!("chat session '{}' not found", session_id))
}

fn duplicate_session(session_id: &str) -> StoreError {
    StoreError::Conflict(format!("chat session '{}' already exists", session_id))
}

/// In-process store for development and tests
#[derive(Debug, Default)]
pub struct MemoryChatStore {
    docs: RwLock<HashMap<Uuid, ChatDocument>>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(&self, doc: ChatDocument) -> Result<ChatDocument, StoreError> {
        let mut docs = self.docs.write().await;
        let taken = docs
            .values()
            .any(|d| d.user_id == doc.user_id && d.session_id == doc.session_id);
        if taken {
            return Err(duplicate_session(&doc.session_id));
        }
        docs.insert(doc.id, doc.clone());
        Ok(doc)
    }

    async fn find_by_session(&self, user_id: Uuid, session_id: &str) -> Result<Option<ChatDocument>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs
            .values()
            .find(|d| d.user_id == user_id && d.session_id == session_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ChatDocument>, StoreError> {
        let docs = self.docs.read().await;
        let mut owned: Vec<ChatDocument> = docs.values().filter(|d| d.user_id == user_id).cloned().collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }

    async fn append_turn(
        &self,
        user_id: Uuid,
        session_id: &str,
        turn: ConversationTurn,
        now: DateTime<Utc>,
    ) -> Result<ChatDocument, StoreError> {
        let mut docs = self.docs.write().await;
        let doc = docs
            .values_mut()
            .find(|d| d.user_id == user_id && d.session_id == session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        doc.push_turn(turn, now);
        Ok(doc.clone())
    }
}

/// Postgres store; the conversation lives in a JSONB array column
#[derive(Debug, Clone)]
pub struct PgChatStore {
    pool: PgPool,
}

impl PgChatStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn into_document(row: ChatRow) -> Result<ChatDocument, StoreError> {
        ChatDocument::try_from(row).map_err(StoreError::Corrupt)
    }
}

const CHAT_COLUMNS: &str = "id, user_id, session_id, topic, conversation, created_at, updated_at";

#[async_trait]
impl ChatStore for PgChatStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, doc: ChatDocument) -> Result<ChatDocument, StoreError> {
        let sql = format!(
            "INSERT INTO chats ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {cols}",
            cols = CHAT_COLUMNS
        );

        let result = sqlx::query_as::<_, ChatRow>(&sql)
            .bind(doc.id)
            .bind(doc.user_id)
            .bind(&doc.session_id)
            .bind(doc.topic.as_str())
            .bind(Json(&doc.conversation))
            .bind(doc.created_at)
            .bind(doc.updated_at)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => Self::into_document(row),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(duplicate_session(&doc.session_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_session(&self, user_id: Uuid, session_id: &str) -> Result<Option<ChatDocument>, StoreError> {
        let sql = format!(
            "SELECT {} FROM chats WHERE user_id = $1 AND session_id = $2",
            CHAT_COLUMNS
        );

        let row = sqlx::query_as::<_, ChatRow>(&sql)
            .bind(user_id)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::into_document).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ChatDocument>, StoreError> {
        let sql = format!(
            "SELECT {} FROM chats WHERE user_id = $1 ORDER BY updated_at DESC",
            CHAT_COLUMNS
        );

        let rows = sqlx::query_as::<_, ChatRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::into_document).collect()
    }

    async fn append_turn(
        &self,
        user_id: Uuid,
        session_id: &str,
        turn: ConversationTurn,
        now: DateTime<Utc>,
    ) -> Result<ChatDocument, StoreError> {
        // jsonb || jsonb-array appends in a single statement
        let sql = format!(
            "UPDATE chats SET conversation = conversation || $3, updated_at = $4 \
             WHERE user_id = $1 AND session_id = $2 RETURNING {}",
            CHAT_COLUMNS
        );

        let row = sqlx::query_as::<_, ChatRow>(&sql)
            .bind(user_id)
            .bind(session_id)
            .bind(Json(vec![turn]))
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::into_document(row),
            None => Err(session_not_found(session_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{NewChatDocument, NewTurn, Role};

    fn doc(user_id: Uuid, session_id: &str) -> ChatDocument {
        let draft = NewChatDocument {
            session_id: Some(session_id.to_string()),
            conversation: Some(vec![NewTurn::new(Role::User, "hello")]),
            topic: None,
        };
        ChatDocument::create(user_id, draft, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_scopes_by_owner() {
        let store = MemoryChatStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.insert(doc(alice, "s1")).await.unwrap();
        store.insert(doc(bob, "s1")).await.unwrap();

        assert_eq!(store.list_for_user(alice).await.unwrap().len(), 1);
        assert!(store.find_by_session(alice, "s1").await.unwrap().is_some());
        assert!(store.find_by_session(alice, "s2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_rejects_duplicate_session() {
        let store = MemoryChatStore::new();
        let user = Uuid::new_v4();

        store.insert(doc(user, "s1")).await.unwrap();
        let err = store.insert(doc(user, "s1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_memory_store_append() {
        let store = MemoryChatStore::new();
        let user = Uuid::new_v4();
        let created = store.insert(doc(user, "s1")).await.unwrap();

        let later = created.updated_at + chrono::Duration::seconds(1);
        let turn = ConversationTurn::from_draft(NewTurn::new(Role::Assistant, "hi"), "turn", later).unwrap();
        let updated = store.append_turn(user, "s1", turn, later).await.unwrap();

        assert_eq!(updated.conversation.len(), 2);
        assert_eq!(updated.conversation[1].role, Role::Assistant);
        assert_eq!(updated.updated_at, later);

        let turn = ConversationTurn::from_draft(NewTurn::new(Role::User, "x"), "turn", later).unwrap();
        let err = store.append_turn(Uuid::new_v4(), "s1", turn, later).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
