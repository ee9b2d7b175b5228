use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::models::chat::{ChatDocument, ConversationTurn, Topic};

/// Row shape of the `chats` table
#[derive(Debug, Clone, FromRow)]
pub struct ChatRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_id: String,
    pub topic: String,
    pub conversation: Json<Vec<ConversationTurn>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ChatRow> for ChatDocument {
    type Error = String;

    fn try_from(row: ChatRow) -> Result<Self, Self::Error> {
        let topic = row
            .topic
            .parse::<Topic>()
            .map_err(|e| format!("chat {}: {}", row.id, e))?;

        Ok(ChatDocument {
            id: row.id,
            user_id: row.user_id,
            conversation: row.conversation.0,
            session_id: row.session_id,
            topic,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
