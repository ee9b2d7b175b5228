// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::chat_store::StoreError;
use crate::models::chat::ChatError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError {
            field_errors: Some(field_errors),
            ..
        } = self
        {
            response["field_errors"] = json!(field_errors);
        }

        response
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<HashMap<String, String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(err.field().to_string(), err.to_string());
        ApiError::validation_error("Chat document failed validation", Some(field_errors))
    }
}

impl ApiError {
    /// Map a request body rejection. Type mismatches become field-scoped
    /// validation errors; `prefix` roots the field path (e.g. `turn`).
    pub fn from_json_rejection(rejection: JsonRejection, prefix: &str) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => {
                let text = e.body_text();
                let (field, message) = rejection_field(&text, prefix);
                let mut field_errors = HashMap::new();
                field_errors.insert(field, message);
                ApiError::validation_error("Request body failed validation", Some(field_errors))
            }
            JsonRejection::JsonSyntaxError(e) => {
                let mut field_errors = HashMap::new();
                field_errors.insert(join_field(prefix, "body"), e.body_text());
                ApiError::validation_error("Request body is not valid JSON", Some(field_errors))
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::bad_request("Expected request with `Content-Type: application/json`")
            }
            other => ApiError::bad_request(other.body_text()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::from_json_rejection(rejection, "")
    }
}

/// Split `...target type: conversation[0].message: invalid type: ...` into a
/// dotted field path and the serde message.
fn rejection_field(text: &str, prefix: &str) -> (String, String) {
    let detail = text
        .split_once("target type: ")
        .map(|(_, rest)| rest)
        .unwrap_or(text);

    match detail.split_once(": ") {
        Some((path, message)) if !path.is_empty() && path != "." && !path.contains(' ') => {
            let dotted = path.replace('[', ".").replace(']', "");
            (join_field(prefix, &dotted), message.to_string())
        }
        _ => (join_field(prefix, "body"), detail.to_string()),
    }
}

fn join_field(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::not_found(msg),
            StoreError::Conflict(msg) => ApiError::conflict(msg),
            StoreError::Corrupt(msg) => {
                tracing::error!("Corrupt chat document: {}", msg);
                ApiError::internal_server_error("Stored chat document could not be read")
            }
            StoreError::Database(db_err) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Chat store error: {}", db_err);
                ApiError::service_unavailable("Chat storage temporarily unavailable")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_maps_to_field_errors() {
        let api: ApiError = ChatError::MissingField("conversation.0.message".to_string()).into();
        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);

        let body = api.to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["field_errors"]["conversation.0.message"].is_string());
    }

    #[test]
    fn test_rejection_text_maps_to_dotted_field() {
        let text = "Failed to deserialize the JSON body into the target type: \
                    conversation[0].message: invalid type: integer `42`, expected a string at line 1 column 40";
        let (field, message) = rejection_field(text, "");
        assert_eq!(field, "conversation.0.message");
        assert!(message.starts_with("invalid type: integer `42`"));

        let text = "Failed to deserialize the JSON body into the target type: timestamp: input contains invalid characters";
        assert_eq!(rejection_field(text, "turn").0, "turn.timestamp");

        let text = "Failed to deserialize the JSON body into the target type: invalid type: integer `1`, expected struct NewTurn";
        assert_eq!(rejection_field(text, "turn").0, "turn.body");
    }

    #[test]
    fn test_store_errors_map_to_status() {
        let api: ApiError = StoreError::NotFound("x".into()).into();
        assert_eq!(api.status_code(), StatusCode::NOT_FOUND);

        let api: ApiError = StoreError::Conflict("x".into()).into();
        assert_eq!(api.status_code(), StatusCode::CONFLICT);
    }
}
