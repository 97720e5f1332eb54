// ============================================================================
// Order Store - Persistence Layer
// ============================================================================
//
// One trait, two interchangeable implementations:
// - memory   - insertion-ordered Vec behind a single mutex
// - postgres - durable `orders` table accessed through sqlx
//
// The service and the HTTP layer only ever see `Arc<dyn OrderStore>`.
//
// ============================================================================

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{Order, OrderStatus};

pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

impl StoreError {
    #[cfg(test)]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// All orders, oldest first, optionally restricted to one status.
    async fn list(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>>;

    async fn get(&self, id: &str) -> StoreResult<Order>;

    /// Persist a new order. An empty id is replaced with a fresh one.
    async fn create(&self, order: Order) -> StoreResult<Order>;

    /// Replace the status (when given) and refresh `updated_at`.
    async fn update(&self, id: &str, status: Option<OrderStatus>) -> StoreResult<Order>;

    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Connectivity probe used by the readiness endpoint.
    async fn ping(&self) -> StoreResult<()>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}
