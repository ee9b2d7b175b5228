use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use chrono::Utc;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::chat::{ChatDocument, ConversationTurn, NewChatDocument, NewTurn};

/// GET /chat - every chat session owned by the caller, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<ChatDocument>> {
    let docs = state.store.list_for_user(user.user_id).await?;
    Ok(ApiResponse::success(docs))
}

/// POST /chat - validate and persist a new chat document
///
/// The owner is always the authenticated caller. Validation runs before the
/// store is touched, so a rejected draft writes nothing.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewChatDocument>, JsonRejection>,
) -> ApiResult<ChatDocument> {
    let Json(draft) = payload?;
    let doc = ChatDocument::create(user.user_id, draft, Utc::now())?;
    let saved = state.store.insert(doc).await?;

    tracing::info!(
        "Created chat session {} for user {} ({} turns, topic {})",
        saved.session_id,
        user.user_id,
        saved.conversation.len(),
        saved.topic
    );
    Ok(ApiResponse::created(saved))
}

/// GET /chat/:session_id
pub async fn show(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> ApiResult<ChatDocument> {
    state
        .store
        .find_by_session(user.user_id, &session_id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("chat session '{}' not found", session_id)))
}

/// POST /chat/:session_id/turns - append one turn to the end of the conversation
pub async fn append_turn(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
    payload: Result<Json<NewTurn>, JsonRejection>,
) -> ApiResult<ChatDocument> {
    let Json(draft) = payload.map_err(|rejection| ApiError::from_json_rejection(rejection, "turn"))?;
    let now = Utc::now();
    let turn = ConversationTurn::from_draft(draft, "turn", now)?;
    let updated = state.store.append_turn(user.user_id, &session_id, turn, now).await?;

    tracing::debug!("Appended turn to chat session {} ({} turns)", session_id, updated.conversation.len());
    Ok(ApiResponse::success(updated))
}
