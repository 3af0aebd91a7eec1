use serde_json::{Map, Value};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::entity::{EntityDescriptor, EntityKind, ValidatedFields};

/// Owner-scoped storage for one record collection.
///
/// Every statement carries a `user_id = $owner` predicate, so a record
/// owned by another user is indistinguishable from one that does not
/// exist. Table and column names come only from the static entity
/// registry; request values are always bound parameters.
pub struct RecordStore {
    descriptor: &'static EntityDescriptor,
    pool: PgPool,
}

impl RecordStore {
    pub fn new(kind: EntityKind, pool: PgPool) -> Self {
        Self {
            descriptor: kind.descriptor(),
            pool,
        }
    }

    /// All records owned by `owner`, newest first
    pub async fn list(&self, owner: Uuid) -> Result<Vec<Map<String, Value>>, DatabaseError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" WHERE user_id = $1 ORDER BY created_at DESC, id) t",
            self.descriptor.collection
        );

        let rows = sqlx::query(&sql).bind(owner).fetch_all(&self.pool).await?;
        rows.into_iter().map(row_object).collect()
    }

    pub async fn count(&self, owner: Uuid) -> Result<i64, DatabaseError> {
        let sql = format!(
            "SELECT COUNT(*) AS count FROM \"{}\" WHERE user_id = $1",
            self.descriptor.collection
        );

        let row = sqlx::query(&sql).bind(owner).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    /// Insert a new record owned by `owner` from validated field values
    pub async fn insert(
        &self,
        owner: Uuid,
        fields: ValidatedFields,
    ) -> Result<Map<String, Value>, DatabaseError> {
        let table = self.descriptor.collection;

        let mut columns = vec!["user_id".to_string()];
        columns.extend(fields.iter().map(|(column, _)| format!("\"{}\"", column)));
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();

        let sql = format!(
            "INSERT INTO \"{table}\" ({}) VALUES ({}) RETURNING row_to_json(\"{table}\") AS row",
            columns.join(", "),
            placeholders.join(", "),
        );

        let mut query = sqlx::query(&sql).bind(owner);
        for (_, value) in &fields {
            query = query.bind(value);
        }

        let row = query.fetch_one(&self.pool).await?;
        row_object(row)
    }

    /// Fetch one record by id; None covers both nonexistence and foreign ownership
    pub async fn fetch(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> Result<Option<Map<String, Value>>, DatabaseError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" WHERE id = $1 AND user_id = $2) t",
            self.descriptor.collection
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_object).transpose()
    }

    /// Apply a partial update; `updated_at` is refreshed by the statement itself
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        fields: ValidatedFields,
    ) -> Result<Option<Map<String, Value>>, DatabaseError> {
        let table = self.descriptor.collection;

        let assignments: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("\"{}\" = ${}", column, i + 3))
            .collect();

        let sql = format!(
            "UPDATE \"{table}\" SET {}, updated_at = now() WHERE id = $1 AND user_id = $2 RETURNING row_to_json(\"{table}\") AS row",
            assignments.join(", "),
        );

        let mut query = sqlx::query(&sql).bind(id).bind(owner);
        for (_, value) in &fields {
            query = query.bind(value);
        }

        let row = query.fetch_optional(&self.pool).await?;
        row.map(row_object).transpose()
    }

    /// Hard delete. Returns false when no owned record matched.
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!(
            "DELETE FROM \"{}\" WHERE id = $1 AND user_id = $2",
            self.descriptor.collection
        );

        let result = sqlx::query(&sql).bind(id).bind(owner).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_object(row: PgRow) -> Result<Map<String, Value>, DatabaseError> {
    let value: Value = row.try_get("row")?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DatabaseError::QueryError("unexpected record format".to_string())),
    }
}
