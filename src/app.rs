use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{self, SecurityConfig};
use crate::database::chat_store::ChatStore;
use crate::handlers;
use crate::middleware::jwt_auth_middleware;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ChatStore>,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn ChatStore>, jwt_secret: &str) -> Self {
        Self {
            store,
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected
        .merge(chat_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config::config().security)),
        )
        .with_state(state)
}

/// Allow the configured browser origins; an unset list or disabled CORS adds no headers
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn chat_routes(state: AppState) -> Router<AppState> {
    use handlers::chat;

    Router::new()
        .route("/chat", get(chat::list).post(chat::create))
        .route("/chat/:session_id", get(chat::show))
        .route("/chat/:session_id/turns", post(chat::append_turn))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "finpal",
            "version": version,
            "description": "Chat history backend for the finpal personal finance companion",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "chat": "/chat[/:session_id[/turns]] (protected)",
            }
        }
    }))
}

async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": state.store.name()
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "chat store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}
