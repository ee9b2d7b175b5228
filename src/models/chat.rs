use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Current version of the [`TurnContext`] key set
pub const TURN_CONTEXT_VERSION: u32 = 1;

/// Schema violations raised before a chat document is written
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChatError {
    #[error("Path `{0}` is required")]
    MissingField(String),

    #[error("`{value}` is not a valid role at `{path}`")]
    InvalidRole { path: String, value: String },

    #[error("`{0}` is not a valid topic")]
    InvalidTopic(String),

    #[error("Invalid context at `{path}`: {message}")]
    InvalidContext { path: String, message: String },
}

impl ChatError {
    /// Dotted path of the offending field
    pub fn field(&self) -> &str {
        match self {
            ChatError::MissingField(path) => path,
            ChatError::InvalidRole { path, .. } => path,
            ChatError::InvalidTopic(_) => "topic",
            ChatError::InvalidContext { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Budgeting,
    Investing,
    Saving,
    Debt,
    #[default]
    General,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Budgeting => "budgeting",
            Topic::Investing => "investing",
            Topic::Saving => "saving",
            Topic::Debt => "debt",
            Topic::General => "general",
        }
    }
}

impl FromStr for Topic {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "budgeting" => Ok(Topic::Budgeting),
            "investing" => Ok(Topic::Investing),
            "saving" => Ok(Topic::Saving),
            "debt" => Ok(Topic::Debt),
            "general" => Ok(Topic::General),
            other => Err(ChatError::InvalidTopic(other.to_string())),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed side-channel data attached to a conversation turn.
///
/// Version 1 keys: `category`, `amount`, `budgetSnapshotId`, `moduleId`, `badge`.
/// Unknown keys are rejected so the stored shape cannot drift silently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TurnContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_snapshot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

impl TurnContext {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.amount.is_none()
            && self.budget_snapshot_id.is_none()
            && self.module_id.is_none()
            && self.badge.is_none()
    }

    /// Parse an untrusted JSON bag into the versioned key set.
    /// `null` and `{}` both yield an empty context.
    pub fn from_value(value: Value, path: &str) -> Result<Self, ChatError> {
        let invalid = |message: String| ChatError::InvalidContext {
            path: path.to_string(),
            message,
        };

        if value.is_null() {
            return Ok(Self::default());
        }
        if !value.is_object() {
            return Err(invalid("context must be an object".to_string()));
        }

        let mut context: TurnContext =
            serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;

        match context.version {
            Some(v) if v != TURN_CONTEXT_VERSION => {
                return Err(invalid(format!("unsupported context version {}", v)));
            }
            None if !context.is_empty() => context.version = Some(TURN_CONTEXT_VERSION),
            _ => {}
        }

        Ok(context)
    }
}

/// Untrusted turn input as received over the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTurn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl NewTurn {
    pub fn new(role: Role, message: impl Into<String>) -> Self {
        Self {
            role: Some(role.as_str().to_string()),
            message: Some(message.into()),
            timestamp: None,
            context: None,
        }
    }
}

/// Untrusted chat document input; the owner comes from the authenticated caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Vec<NewTurn>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub role: Role,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub context: TurnContext,
}

impl ConversationTurn {
    /// Validate a single turn. `path` prefixes field names in errors,
    /// e.g. `conversation.2`.
    pub fn from_draft(draft: NewTurn, path: &str, now: DateTime<Utc>) -> Result<Self, ChatError> {
        let role = match draft.role {
            None => return Err(ChatError::MissingField(format!("{}.role", path))),
            Some(raw) => raw.parse::<Role>().map_err(|value| ChatError::InvalidRole {
                path: format!("{}.role", path),
                value,
            })?,
        };

        let message = match draft.message {
            Some(m) if !m.is_empty() => m,
            _ => return Err(ChatError::MissingField(format!("{}.message", path))),
        };

        let context = match draft.context {
            Some(raw) => TurnContext::from_value(raw, &format!("{}.context", path))?,
            None => TurnContext::default(),
        };

        Ok(Self {
            role,
            message,
            timestamp: draft.timestamp.unwrap_or(now),
            context,
        })
    }
}

/// A persisted chat session owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub conversation: Vec<ConversationTurn>,
    pub session_id: String,
    pub topic: Topic,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatDocument {
    /// Validate a draft and build the document to persist.
    ///
    /// Every turn is checked before anything is built, so a rejected
    /// draft never yields a partial document.
    pub fn create(user_id: Uuid, draft: NewChatDocument, now: DateTime<Utc>) -> Result<Self, ChatError> {
        let session_id = match draft.session_id {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Err(ChatError::MissingField("sessionId".to_string())),
        };

        let topic = match draft.topic {
            Some(raw) => raw.parse::<Topic>()?,
            None => Topic::default(),
        };

        let conversation = draft
            .conversation
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, turn)| ConversationTurn::from_draft(turn, &format!("conversation.{}", i), now))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            conversation,
            session_id,
            topic,
            created_at: now,
            updated_at: now,
        })
    }

    /// Append an already validated turn at the end of the conversation
    pub fn push_turn(&mut self, turn: ConversationTurn, now: DateTime<Utc>) {
        self.conversation.push(turn);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hello_draft() -> NewChatDocument {
        NewChatDocument {
            session_id: Some("sess-1".to_string()),
            conversation: Some(vec![NewTurn::new(Role::User, "hello")]),
            topic: None,
        }
    }

    #[test]
    fn test_defaults_topic_and_timestamp() {
        let before = Utc::now();
        let doc = ChatDocument::create(Uuid::new_v4(), hello_draft(), Utc::now()).unwrap();
        let after = Utc::now();

        assert_eq!(doc.topic, Topic::General);
        assert_eq!(doc.conversation.len(), 1);
        let ts = doc.conversation[0].timestamp;
        assert!(ts >= before && ts <= after);
        assert_eq!(doc.created_at, doc.updated_at);
        assert!(doc.conversation[0].context.is_empty());
    }

    #[test]
    fn test_missing_message_rejected() {
        let mut draft = hello_draft();
        draft.conversation = Some(vec![
            NewTurn::new(Role::User, "hi"),
            NewTurn {
                role: Some("assistant".to_string()),
                ..Default::default()
            },
        ]);

        let err = ChatDocument::create(Uuid::new_v4(), draft, Utc::now()).unwrap_err();
        assert_eq!(err, ChatError::MissingField("conversation.1.message".to_string()));
    }

    #[test]
    fn test_invalid_role_and_topic_rejected() {
        let mut draft = hello_draft();
        draft.conversation = Some(vec![NewTurn {
            role: Some("system".to_string()),
            message: Some("x".to_string()),
            ..Default::default()
        }]);
        let err = ChatDocument::create(Uuid::new_v4(), draft, Utc::now()).unwrap_err();
        assert!(matches!(err, ChatError::InvalidRole { ref value, .. } if value == "system"));
        assert_eq!(err.field(), "conversation.0.role");

        let mut draft = hello_draft();
        draft.topic = Some("crypto".to_string());
        let err = ChatDocument::create(Uuid::new_v4(), draft, Utc::now()).unwrap_err();
        assert_eq!(err, ChatError::InvalidTopic("crypto".to_string()));
    }

    #[test]
    fn test_missing_session_id_rejected() {
        let mut draft = hello_draft();
        draft.session_id = Some("   ".to_string());
        let err = ChatDocument::create(Uuid::new_v4(), draft, Utc::now()).unwrap_err();
        assert_eq!(err.field(), "sessionId");
    }

    #[test]
    fn test_push_turn_preserves_order() {
        let mut doc = ChatDocument::create(Uuid::new_v4(), hello_draft(), Utc::now()).unwrap();
        let later = doc.created_at + chrono::Duration::seconds(5);

        for (role, text) in [(Role::Assistant, "hi there"), (Role::User, "how do I save?")] {
            let turn = ConversationTurn::from_draft(NewTurn::new(role, text), "turn", later).unwrap();
            doc.push_turn(turn, later);
        }

        let messages: Vec<&str> = doc.conversation.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["hello", "hi there", "how do I save?"]);
        assert_eq!(doc.conversation[1].timestamp, later);
        assert_eq!(doc.updated_at, later);
    }

    #[test]
    fn test_turn_without_role_rejected() {
        let err = ConversationTurn::from_draft(
            NewTurn { message: Some("x".into()), ..Default::default() },
            "turn",
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, ChatError::MissingField("turn.role".to_string()));
    }

    #[test]
    fn test_context_versioning() {
        let ctx = TurnContext::from_value(json!({ "category": "groceries", "amount": 12.5 }), "c").unwrap();
        assert_eq!(ctx.version, Some(TURN_CONTEXT_VERSION));
        assert_eq!(ctx.category.as_deref(), Some("groceries"));

        let empty = TurnContext::from_value(json!({}), "c").unwrap();
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({}));

        let err = TurnContext::from_value(json!({ "mood": "happy" }), "c").unwrap_err();
        assert!(matches!(err, ChatError::InvalidContext { .. }));

        let err = TurnContext::from_value(json!({ "version": 2 }), "c").unwrap_err();
        assert!(matches!(err, ChatError::InvalidContext { .. }));
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let doc = ChatDocument::create(Uuid::new_v4(), hello_draft(), Utc::now()).unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["sessionId"], "sess-1");
        assert_eq!(value["topic"], "general");
        assert_eq!(value["conversation"][0]["role"], "user");
        assert!(value.get("userId").is_some());
        assert!(value.get("createdAt").is_some());
    }
}
