use axum::{
    extract::{Extension, Path},
    response::Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::records::RecordStore;
use crate::entity::EntityKind;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Principal};

/// Resolve the collection path segment against the closed registry
fn resolve_collection(segment: &str) -> Result<EntityKind, ApiError> {
    EntityKind::from_collection(segment)
        .ok_or_else(|| ApiError::not_found(format!("Unknown collection: {}", segment)))
}

/// A malformed id cannot name an accessible record
fn parse_record_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::not_found("Record not found"))
}

/// GET /api/:collection - List the caller's records, newest first
pub async fn list(
    Path(collection): Path<String>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Value> {
    let kind = resolve_collection(&collection)?;

    let pool = DatabaseManager::pool().await?;
    let records = RecordStore::new(kind, pool).list(principal.user_id).await?;

    let data = records.into_iter().map(Value::Object).collect();
    Ok(ApiResponse::success(Value::Array(data)))
}

/// POST /api/:collection - Create a record owned by the caller
pub async fn create(
    Path(collection): Path<String>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let kind = resolve_collection(&collection)?;

    // Input gate runs before any storage access
    let fields = kind.descriptor().validate_create(&payload)?;

    let pool = DatabaseManager::pool().await?;
    let record = RecordStore::new(kind, pool)
        .insert(principal.user_id, fields)
        .await?;

    Ok(ApiResponse::created(Value::Object(record)))
}

/// GET /api/:collection/:id - Fetch one owned record
pub async fn get(
    Path((collection, id)): Path<(String, String)>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Value> {
    let kind = resolve_collection(&collection)?;
    let id = parse_record_id(&id)?;

    let pool = DatabaseManager::pool().await?;
    let record = RecordStore::new(kind, pool).fetch(principal.user_id, id).await?;

    match record {
        Some(record) => Ok(ApiResponse::success(Value::Object(record))),
        None => Err(ApiError::not_found("Record not found")),
    }
}

/// PATCH /api/:collection/:id - Partially update one owned record
pub async fn update(
    Path((collection, id)): Path<(String, String)>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let kind = resolve_collection(&collection)?;
    let id = parse_record_id(&id)?;

    let fields = kind.descriptor().validate_update(&payload)?;

    let pool = DatabaseManager::pool().await?;
    let record = RecordStore::new(kind, pool)
        .update(principal.user_id, id, fields)
        .await?;

    match record {
        Some(record) => Ok(ApiResponse::success(Value::Object(record))),
        None => Err(ApiError::not_found("Record not found")),
    }
}

/// DELETE /api/:collection/:id - Hard delete; a repeat delete is a 404
pub async fn delete(
    Path((collection, id)): Path<(String, String)>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<()> {
    let kind = resolve_collection(&collection)?;
    let id = parse_record_id(&id)?;

    let pool = DatabaseManager::pool().await?;
    let deleted = RecordStore::new(kind, pool).delete(principal.user_id, id).await?;

    if deleted {
        Ok(ApiResponse::<()>::no_content())
    } else {
        Err(ApiError::not_found("Record not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_collection_is_a_404() {
        let err = resolve_collection("widgets").unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn malformed_id_reads_as_missing_record() {
        let err = parse_record_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "Record not found");
    }
}
