use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use murmur_types::api::{LoginRequest, RegisterRequest, UserResponse};

use crate::convert::user_response;
use crate::error::ApiError;
use crate::service::{AppState, ChatService, now};

const MAX_USERNAME_CHARS: usize = 50;

impl ChatService {
    /// Creates a user. Admin tooling may omit the password, registration may not.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        require_password: bool,
    ) -> Result<UserResponse, ApiError> {
        let username = username.trim().to_string();
        let length = username.chars().count();
        if length == 0 || length > MAX_USERNAME_CHARS {
            return Err(ApiError::validation(format!(
                "username must be between 1 and {} characters",
                MAX_USERNAME_CHARS
            )));
        }
        if require_password && password.is_empty() {
            return Err(ApiError::validation("password must not be empty"));
        }

        let password_hash = hash_password(password)?;
        let created_at = now();

        let name = username.clone();
        let id = self
            .blocking(move |db| db.create_user(&name, &password_hash, created_at))
            .await?
            .ok_or_else(|| ApiError::validation("username is already taken"))?;

        info!("New user registered: {} ({})", username, id);

        Ok(UserResponse {
            id,
            username,
            created_at,
            avg_sentiment: None,
            avg_sentiment_confidence: None,
        })
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<UserResponse, ApiError> {
        let name = username.trim().to_string();
        let user = self
            .blocking(move |db| db.get_user_by_username(&name))
            .await?
            .ok_or(ApiError::Unauthorized)?;

        if !verify_password(password, &user.password)? {
            return Err(ApiError::Unauthorized);
        }

        info!("User logged in: {}", user.username);
        Ok(user_response(user, None))
    }

    pub async fn get_user(&self, id: i64) -> Result<UserResponse, ApiError> {
        let user = self
            .blocking(move |db| db.get_user_by_id(id))
            .await?
            .ok_or_else(ApiError::user_not_found)?;

        Ok(user_response(user, None))
    }
}

/// Argon2id with a fresh salt per user.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| anyhow::anyhow!("corrupt password hash: {}", e))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.register(&req.username, &req.password, true).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.login(&req.username, &req.password).await?;
    Ok(Json(user))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.get_user(id).await?))
}
