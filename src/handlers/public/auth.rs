use axum::response::Json;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::{generate_jwt, hash_password, verify_password, Claims};
use crate::config;
use crate::database::manager::{DatabaseManager, DatabaseError};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

const INSERT_USER_SQL: &str =
    "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
     RETURNING id, email, password_hash, created_at, updated_at";

const SELECT_USER_BY_EMAIL_SQL: &str =
    "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE email = $1";

/// POST /auth/register - Create a new user account
pub async fn register(Json(payload): Json<Value>) -> ApiResult<Value> {
    let (email, password) = credentials_from(&payload)?;

    let pool = DatabaseManager::pool().await?;
    let password_hash = hash_password(&password);

    let result = sqlx::query_as::<_, User>(INSERT_USER_SQL)
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(&pool)
        .await;

    let user = match result {
        Ok(user) => user,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(ApiError::conflict("Email is already registered"));
        }
        Err(e) => return Err(DatabaseError::from(e).into()),
    };

    tracing::info!("Registered user {}", user.id);
    Ok(ApiResponse::created(user.to_api_value()))
}

/// POST /auth/login - Authenticate and receive a JWT token
pub async fn login(Json(payload): Json<Value>) -> ApiResult<Value> {
    let (email, password) = credentials_from(&payload)?;

    let pool = DatabaseManager::pool().await?;
    let user = sqlx::query_as::<_, User>(SELECT_USER_BY_EMAIL_SQL)
        .bind(&email)
        .fetch_optional(&pool)
        .await
        .map_err(DatabaseError::from)?;

    // Same response for unknown email and wrong password
    let user = match user {
        Some(user) if verify_password(&password, &user.password_hash) => user,
        _ => return Err(ApiError::unauthorized("Invalid email or password")),
    };

    let token = generate_jwt(Claims::new(user.id, user.email.clone()))?;
    let expires_in = config::config().security.jwt_expiry_hours * 3600;

    Ok(ApiResponse::success(json!({
        "token": token,
        "expires_in": expires_in,
        "user": user.to_api_value(),
    })))
}

/// Pull and validate `{ email, password }` from a JSON body
fn credentials_from(payload: &Value) -> Result<(String, String), ApiError> {
    let map = payload
        .as_object()
        .ok_or_else(|| ApiError::invalid_json("Expected a JSON object"))?;

    let mut field_errors = HashMap::new();

    let email = map.get("email").and_then(Value::as_str).unwrap_or_default();
    if email.is_empty() || !email.contains('@') {
        field_errors.insert("email".to_string(), "A valid email address is required".to_string());
    }

    let password = map.get("password").and_then(Value::as_str).unwrap_or_default();
    if password.len() < 8 {
        field_errors.insert(
            "password".to_string(),
            "Password must be at least 8 characters".to_string(),
        );
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Invalid credentials payload", Some(field_errors)));
    }

    Ok((email.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_password_shorter_than_eight() {
        let err = credentials_from(&json!({"email": "a@b.example", "password": "short"}))
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn rejects_email_without_at_sign() {
        let err = credentials_from(&json!({"email": "nobody", "password": "long enough"}))
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn accepts_wellformed_credentials() {
        let (email, password) =
            credentials_from(&json!({"email": "a@b.example", "password": "long enough"})).unwrap();
        assert_eq!(email, "a@b.example");
        assert_eq!(password, "long enough");
    }
}
