use serde::Deserialize;

use crate::client::{ApiClient, ClientError};
use crate::models::{ChatDocument, NewChatDocument, NewTurn};

use super::log_failure;

/// `{ "success": true, "data": ... }` as produced by the chat routes
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Client for the chat history routes
#[derive(Debug, Clone)]
pub struct ChatService {
    client: ApiClient,
}

impl ChatService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// GET /chat
    pub async fn list_sessions(&self) -> Result<Vec<ChatDocument>, ClientError> {
        let result = self.client.get::<Envelope<Vec<ChatDocument>>>(&["chat"]).await;
        log_failure("listSessions", result).map(|e| e.data)
    }

    /// POST /chat
    pub async fn start_session(&self, draft: &NewChatDocument) -> Result<ChatDocument, ClientError> {
        let result = self.client.post::<_, Envelope<ChatDocument>>(&["chat"], draft).await;
        log_failure("startSession", result).map(|e| e.data)
    }

    /// GET /chat/{session_id}
    pub async fn get_session(&self, session_id: &str) -> Result<ChatDocument, ClientError> {
        let result = self.client.get::<Envelope<ChatDocument>>(&["chat", session_id]).await;
        log_failure("getSession", result).map(|e| e.data)
    }

    /// POST /chat/{session_id}/turns
    pub async fn append_turn(&self, session_id: &str, turn: &NewTurn) -> Result<ChatDocument, ClientError> {
        let result = self
            .client
            .post::<_, Envelope<ChatDocument>>(&["chat", session_id, "turns"], turn)
            .await;
        log_failure("appendTurn", result).map(|e| e.data)
    }
}
