use axum::extract::Extension;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::records::RecordStore;
use crate::entity::{EntityDescriptor, EntityKind};
use crate::middleware::{ApiResponse, ApiResult, Principal};

/// GET /api/dashboard - One tile per collection, in registry order.
///
/// Count queries run concurrently; a failed count renders as 0 rather
/// than failing the whole summary.
pub async fn summary(Extension(principal): Extension<Principal>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let owner = principal.user_id;

    let tiles = futures::future::join_all(EntityKind::ALL.into_iter().map(|kind| {
        let pool = pool.clone();
        async move { tile(kind.descriptor(), count_or_zero(kind, pool, owner).await) }
    }))
    .await;

    Ok(ApiResponse::success(Value::Array(tiles)))
}

async fn count_or_zero(kind: EntityKind, pool: sqlx::PgPool, owner: Uuid) -> i64 {
    match RecordStore::new(kind, pool).count(owner).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!("Count query failed for {}: {}", kind.descriptor().collection, e);
            0
        }
    }
}

fn tile(descriptor: &EntityDescriptor, count: i64) -> Value {
    json!({
        "name": descriptor.display,
        "count": count,
        "href": format!("/{}", descriptor.collection),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_carries_name_count_and_href() {
        let value = tile(EntityKind::Build.descriptor(), 3);
        assert_eq!(value["name"], "Builds");
        assert_eq!(value["count"], 3);
        assert_eq!(value["href"], "/builds");
    }

    #[test]
    fn registry_order_matches_the_dashboard() {
        let names: Vec<&str> = EntityKind::ALL
            .iter()
            .map(|kind| kind.descriptor().display)
            .collect();
        assert_eq!(names, vec!["Builds", "Signals", "Privates", "Privacys", "Keys"]);
    }
}
