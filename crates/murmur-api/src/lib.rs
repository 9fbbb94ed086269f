pub mod auth;
mod convert;
pub mod error;
pub mod messages;
pub mod private_messages;
pub mod seed;
pub mod service;
pub mod users;

use axum::{
    Json, Router,
    routing::{get, post, put},
};
use serde_json::{Value, json};

pub use error::ApiError;
pub use service::{AppState, ChatService};

/// Every HTTP route. Layers (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/{id}", get(auth::get_user))
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/{id}", get(users::get_user))
        .route("/api/messages", get(messages::get_messages).post(messages::send_message))
        .route("/api/messages/{id}", get(messages::get_message))
        .route("/api/messages/user/{user_id}", get(messages::get_messages_by_user))
        .route("/api/privatemessages", post(private_messages::send_private_message))
        .route(
            "/api/privatemessages/conversations/{user_id}",
            get(private_messages::get_conversations),
        )
        .route(
            "/api/privatemessages/conversation/{id}/{other_id}/read",
            put(private_messages::mark_read),
        )
        .route("/api/privatemessages/{id}/status", put(private_messages::update_status))
        .route("/api/privatemessages/{id}/{other_id}", get(private_messages::get_conversation))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
