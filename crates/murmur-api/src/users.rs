use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::warn;

use murmur_db::models::SentimentCountRow;
use murmur_sentiment::SentimentTally;
use murmur_types::api::{RegisterRequest, UserResponse};

use crate::convert::{parse_label, user_response};
use crate::error::ApiError;
use crate::service::{AppState, ChatService};

impl ChatService {
    /// All users by name, each with the dominant sentiment of what they wrote.
    pub async fn list_users(&self) -> Result<Vec<UserResponse>, ApiError> {
        let (users, counts) = self
            .blocking(|db| Ok((db.list_users()?, db.sentiment_counts(None)?)))
            .await?;

        let tallies = tally_by_user(counts);

        Ok(users
            .into_iter()
            .map(|user| {
                let tally = tallies.get(&user.id);
                user_response(user, tally)
            })
            .collect())
    }
}

fn tally_by_user(counts: Vec<SentimentCountRow>) -> HashMap<i64, SentimentTally> {
    let mut tallies: HashMap<i64, SentimentTally> = HashMap::new();
    for row in counts {
        let Some(label) = parse_label(&row.sentiment, row.user_id) else {
            continue;
        };
        let Ok(count) = u64::try_from(row.count) else {
            warn!("Negative sentiment count for user {}", row.user_id);
            continue;
        };
        tallies.entry(row.user_id).or_default().add(label, count);
    }
    tallies
}

/// POST /api/users. Admin creation, the password may be omitted.
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.register(&req.username, &req.password, false).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.list_users().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.get_user(id).await?))
}
