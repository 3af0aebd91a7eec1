use axum::extract::Extension;
use serde_json::Value;

use crate::database::manager::{DatabaseManager, DatabaseError};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Principal};

const SELECT_USER_BY_ID_SQL: &str =
    "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE id = $1";

/// GET /api/auth/whoami - Current user, fresh from storage
pub async fn whoami(Extension(principal): Extension<Principal>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;

    let user = sqlx::query_as::<_, User>(SELECT_USER_BY_ID_SQL)
        .bind(principal.user_id)
        .fetch_optional(&pool)
        .await
        .map_err(DatabaseError::from)?;

    // A valid token for a deleted account resolves to nothing
    match user {
        Some(user) => Ok(ApiResponse::success(user.to_api_value())),
        None => Err(ApiError::not_found("User not found")),
    }
}
