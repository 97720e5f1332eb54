use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;
use uuid::Uuid;

use super::{OrderStore, StoreError, StoreResult};
use crate::models::{Order, OrderItem, OrderStatus};

// ============================================================================
// Postgres Order Store
// ============================================================================
//
// Each operation is a single statement, so atomicity comes from Postgres:
// - create is one INSERT ... RETURNING
// - update is one UPDATE ... RETURNING
//
// Items are persisted as a JSON text payload next to the scalar columns.
//
// ============================================================================

const ORDER_COLUMNS: &str = "id, user_id, items, total, status, created_at, updated_at";

/// `id` breaks ties between rows created within the same microsecond.
const LIST_ORDERING: &str = "created_at ASC, id ASC";

pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Connect, then make sure the `orders` table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        tracing::info!(max_connections, "Connecting to Postgres");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        let store = Self::from_pool(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                items TEXT NOT NULL,
                total DOUBLE PRECISION NOT NULL,
                status TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders (created_at)")
            .execute(&self.pool)
            .await?;

        tracing::info!("Ensured orders table exists");
        Ok(())
    }
}

fn row_to_order(row: &PgRow) -> StoreResult<Order> {
    let id: String = row.try_get("id")?;
    let items_json: String = row.try_get("items")?;
    let status: String = row.try_get("status")?;

    let items: Vec<OrderItem> = serde_json::from_str(&items_json)?;
    let status = status.parse::<OrderStatus>().map_err(|e| StoreError::Corrupt {
        id: id.clone(),
        reason: e.to_string(),
    })?;

    Ok(Order {
        id,
        user_id: row.try_get("user_id")?,
        items,
        total: row.try_get("total")?,
        status,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn list(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY {LIST_ORDERING}"
        );

        let rows = sqlx::query(&sql)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_order).collect()
    }

    async fn get(&self, id: &str) -> StoreResult<Order> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row_to_order(&row),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn create(&self, mut order: Order) -> StoreResult<Order> {
        if order.id.is_empty() {
            let now = Utc::now();
            order.id = Uuid::new_v4().to_string();
            order.created_at = now;
            order.updated_at = now;
        }

        let items_json = serde_json::to_string(&order.items)?;
        let sql = format!(
            "INSERT INTO orders ({ORDER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ORDER_COLUMNS}"
        );

        let row = sqlx::query(&sql)
            .bind(&order.id)
            .bind(&order.user_id)
            .bind(&items_json)
            .bind(order.total)
            .bind(order.status.as_str())
            .bind(order.created_at)
            .bind(order.updated_at)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(order_id = %order.id, "Inserted order row");
        row_to_order(&row)
    }

    async fn update(&self, id: &str, status: Option<OrderStatus>) -> StoreResult<Order> {
        let sql = format!(
            "UPDATE orders SET status = COALESCE($2, status), updated_at = $3 \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(status.map(|s| s.as_str()))
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row_to_order(&row),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

// ============================================================================
// Integration Tests
// ============================================================================
//
// These need a reachable Postgres. Run with:
//   DATABASE_URL=postgres://... cargo test -- --ignored
//
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> PostgresOrderStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        PostgresOrderStore::connect(&url, 2).await.unwrap()
    }

    #[tokio::test]
    #[ignore = "requires postgres"]
    async fn test_create_get_update_delete() {
        let store = store().await;
        let created = store
            .create(Order::new("u1", vec![OrderItem::new("p1", 2, 10.0)]))
            .await
            .unwrap();

        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched.items, created.items);
        assert_eq!(fetched.total, 20.0);

        let updated = store
            .update(&created.id, Some(OrderStatus::Confirmed))
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Confirmed);
        assert_eq!(updated.total, 20.0);

        let touched = store.update(&created.id, None).await.unwrap();
        assert_eq!(touched.status, OrderStatus::Confirmed);
        assert!(touched.updated_at >= updated.updated_at);

        store.delete(&created.id).await.unwrap();
        assert!(store.get(&created.id).await.unwrap_err().is_not_found());
        assert!(store.delete(&created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    #[ignore = "requires postgres"]
    async fn test_list_filter_and_order() {
        let store = store().await;
        let user = format!("list-{}", Uuid::new_v4());
        let first = store
            .create(Order::new(&user, vec![OrderItem::new("p1", 1, 1.0)]))
            .await
            .unwrap();
        let second = store
            .create(
                Order::new(&user, vec![OrderItem::new("p2", 1, 2.0)])
                    .with_status(OrderStatus::Cancelled),
            )
            .await
            .unwrap();

        let mine: Vec<Order> = store
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .filter(|o| o.user_id == user)
            .collect();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, first.id);
        assert_eq!(mine[1].id, second.id);

        let cancelled = store.list(Some(OrderStatus::Cancelled)).await.unwrap();
        assert!(cancelled.iter().all(|o| o.status == OrderStatus::Cancelled));
        assert!(cancelled.iter().any(|o| o.id == second.id));

        store.delete(&first.id).await.unwrap();
        store.delete(&second.id).await.unwrap();
    }

    #[test]
    fn test_list_ordering_has_id_tiebreaker() {
        assert!(LIST_ORDERING.ends_with(", id ASC"));
    }

    #[tokio::test]
    #[ignore = "requires postgres"]
    async fn test_list_breaks_timestamp_ties_by_id() {
        let store = store().await;
        let user = format!("tie-{}", Uuid::new_v4());
        let at = Utc::now();

        let mut later_id = Order::new(&user, vec![OrderItem::new("p1", 1, 1.0)]);
        later_id.id = format!("zz-{}", Uuid::new_v4());
        later_id.created_at = at;
        later_id.updated_at = at;
        let mut earlier_id = later_id.clone();
        earlier_id.id = format!("aa-{}", Uuid::new_v4());

        store.create(later_id.clone()).await.unwrap();
        store.create(earlier_id.clone()).await.unwrap();

        for _ in 0..3 {
            let ids: Vec<String> = store
                .list(None)
                .await
                .unwrap()
                .into_iter()
                .filter(|o| o.user_id == user)
                .map(|o| o.id)
                .collect();
            assert_eq!(ids, vec![earlier_id.id.clone(), later_id.id.clone()]);
        }

        store.delete(&later_id.id).await.unwrap();
        store.delete(&earlier_id.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires postgres"]
    async fn test_undecodable_items_surface_as_error() {
        let store = store().await;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO orders (id, user_id, items, total, status, created_at, updated_at) \
             VALUES ($1, 'u1', 'not json', 1.0, 'pending', NOW(), NOW())",
        )
        .bind(&id)
        .execute(&store.pool)
        .await
        .unwrap();

        let err = store.get(&id).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));

        store.delete(&id).await.unwrap();
    }
}
