use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{OrderStore, StoreError, StoreResult};
use crate::models::{Order, OrderItem, OrderStatus};

// ============================================================================
// In-Memory Order Store
// ============================================================================
//
// Orders live in a Vec in insertion order. Every operation holds the one
// mutex for its whole body, so readers never observe a half-applied write.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<Vec<Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the demo orders served on a fresh start.
    pub fn seeded() -> Self {
        Self {
            orders: Mutex::new(seed_orders()),
        }
    }

    pub async fn len(&self) -> usize {
        self.orders.lock().await.len()
    }
}

fn seed_orders() -> Vec<Order> {
    vec![
        Order::new(
            "user-001",
            vec![
                OrderItem::new("prod-001", 2, 29.99),
                OrderItem::new("prod-003", 1, 49.99),
            ],
        )
        .with_status(OrderStatus::Confirmed),
        Order::new("user-002", vec![OrderItem::new("prod-002", 1, 99.99)]),
        Order::new(
            "user-001",
            vec![
                OrderItem::new("prod-004", 3, 15.00),
                OrderItem::new("prod-005", 1, 199.99),
            ],
        )
        .with_status(OrderStatus::Delivered),
    ]
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn list(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>> {
        let orders = self.orders.lock().await;

        Ok(orders
            .iter()
            .filter(|order| status.map_or(true, |s| order.status == s))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> StoreResult<Order> {
        let orders = self.orders.lock().await;

        orders
            .iter()
            .find(|order| order.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn create(&self, mut order: Order) -> StoreResult<Order> {
        if order.id.is_empty() {
            let now = Utc::now();
            order.id = Uuid::new_v4().to_string();
            order.created_at = now;
            order.updated_at = now;
        }

        let mut orders = self.orders.lock().await;
        orders.push(order.clone());

        tracing::debug!(order_id = %order.id, count = orders.len(), "Stored order in memory");
        Ok(order)
    }

    async fn update(&self, id: &str, status: Option<OrderStatus>) -> StoreResult<Order> {
        let mut orders = self.orders.lock().await;

        let order = orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        order.apply_status(status);
        Ok(order.clone())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut orders = self.orders.lock().await;

        let index = orders
            .iter()
            .position(|order| order.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        orders.remove(index);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
