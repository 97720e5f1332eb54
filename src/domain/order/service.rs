use std::sync::Arc;
use std::time::Instant;

use crate::metrics::Metrics;
use crate::models::{Order, OrderItem, OrderStatus};
use crate::store::OrderStore;

use super::errors::OrderError;

// ============================================================================
// Order Service
// ============================================================================
//
// Orchestrates: Request -> Validation -> Total -> Order Store
//
// Validation always runs before the store is touched, so a rejected request
// never mutates anything (not even `updated_at`).
//
// ============================================================================

pub const INVALID_STATUS_MESSAGE: &str =
    "Invalid status. Must be one of: pending, confirmed, shipped, delivered, cancelled";

pub struct OrderService {
    store: Arc<dyn OrderStore>,
    metrics: Arc<Metrics>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    /// List orders, optionally filtered by an exact status string.
    /// An empty filter means "all"; a filter naming no known status
    /// matches nothing.
    pub async fn list_orders(&self, status_filter: Option<&str>) -> Result<Vec<Order>, OrderError> {
        let started = Instant::now();

        let filter = match status_filter.filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => match raw.parse::<OrderStatus>() {
                Ok(status) => Some(status),
                Err(_) => {
                    tracing::debug!(status = %raw, "Unknown status filter, returning no orders");
                    self.record("list", None, started);
                    return Ok(Vec::new());
                }
            },
        };

        let result = self.store.list(filter).await.map_err(OrderError::from);
        self.record("list", result.as_ref().err(), started);

        let orders = result?;
        tracing::debug!(count = orders.len(), status = ?filter, "Listed orders");
        Ok(orders)
    }

    pub async fn get_order(&self, id: &str) -> Result<Order, OrderError> {
        let started = Instant::now();
        let result = self.store.get(id).await.map_err(OrderError::from);
        self.record("get", result.as_ref().err(), started);
        result
    }

    pub async fn create_order(
        &self,
        user_id: String,
        items: Vec<OrderItem>,
    ) -> Result<Order, OrderError> {
        let started = Instant::now();

        if let Err(err) = validate_new_order(&user_id, &items) {
            tracing::warn!(user_id = %user_id, error = %err, "Rejected order");
            self.record("create", Some(&err), started);
            return Err(err);
        }

        let result = self
            .store
            .create(Order::new(user_id, items))
            .await
            .map_err(OrderError::from);
        self.record("create", result.as_ref().err(), started);

        let order = result?;
        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            item_count = order.items.len(),
            total = order.total,
            "Created order"
        );
        Ok(order)
    }

    /// Replace the status of an order. `None` or an empty string keeps the
    /// current status but still refreshes `updated_at`.
    pub async fn update_order_status(
        &self,
        id: &str,
        status: Option<&str>,
    ) -> Result<Order, OrderError> {
        let started = Instant::now();

        let status = match parse_status(status) {
            Ok(status) => status,
            Err(err) => {
                self.record("update", Some(&err), started);
                return Err(err);
            }
        };

        let result = self.store.update(id, status).await.map_err(OrderError::from);
        self.record("update", result.as_ref().err(), started);

        let order = result?;
        tracing::info!(order_id = %order.id, status = %order.status, "Updated order");
        Ok(order)
    }

    pub async fn delete_order(&self, id: &str) -> Result<(), OrderError> {
        let started = Instant::now();
        let result = self.store.delete(id).await.map_err(OrderError::from);
        self.record("delete", result.as_ref().err(), started);

        result?;
        tracing::info!(order_id = %id, "Deleted order");
        Ok(())
    }

    fn record(&self, operation: &str, error: Option<&OrderError>, started: Instant) {
        let outcome = match error {
            None => "ok",
            Some(OrderError::Validation(_)) => "validation_error",
            Some(OrderError::NotFound(_)) => "not_found",
            Some(OrderError::Internal(_)) => "error",
        };
        self.metrics
            .record_operation(operation, outcome, started.elapsed().as_secs_f64());
    }
}

/// First failing rule wins: user, then item list, then each item in order.
pub fn validate_new_order(user_id: &str, items: &[OrderItem]) -> Result<(), OrderError> {
    if user_id.is_empty() {
        return Err(OrderError::validation("user_id is required"));
    }

    if items.is_empty() {
        return Err(OrderError::validation("At least one item is required"));
    }

    if !items.iter().all(OrderItem::is_valid) {
        return Err(OrderError::validation(
            "Each item must have a valid product_id, quantity > 0, and price > 0",
        ));
    }

    Ok(())
}

fn parse_status(status: Option<&str>) -> Result<Option<OrderStatus>, OrderError> {
    match status.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<OrderStatus>()
            .map(Some)
            .map_err(|_| OrderError::validation(INVALID_STATUS_MESSAGE)),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryOrderStore;

    fn service() -> (OrderService, Arc<InMemoryOrderStore>) {
        let store = Arc::new(InMemoryOrderStore::new());
        let metrics = Arc::new(Metrics::new().unwrap());
        (OrderService::new(store.clone(), metrics), store)
    }

    fn item(product: &str, quantity: i64, price: f64) -> OrderItem {
        OrderItem::new(product, quantity, price)
    }

    fn validation_message(err: OrderError) -> String {
        match err {
            OrderError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_computes_total_and_forces_pending() {
        let (service, _) = service();

        let order = service
            .create_order(
                "u1".to_string(),
                vec![item("p1", 2, 10.0), item("p2", 3, 1.5)],
            )
            .await
            .unwrap();

        assert_eq!(order.total, 24.5);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_validation_order() {
        let (service, store) = service();

        let err = service.create_order(String::new(), vec![]).await.unwrap_err();
        assert_eq!(validation_message(err), "user_id is required");

        let err = service.create_order("u1".into(), vec![]).await.unwrap_err();
        assert_eq!(validation_message(err), "At least one item is required");

        for bad in [item("", 1, 1.0), item("p1", 0, 1.0), item("p1", 1, -1.0)] {
            let err = service
                .create_order("u1".into(), vec![item("ok", 1, 1.0), bad])
                .await
                .unwrap_err();
            assert_eq!(
                validation_message(err),
                "Each item must have a valid product_id, quantity > 0, and price > 0"
            );
        }

        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_update_with_unknown_status_leaves_record_untouched() {
        let (service, _) = service();
        let created = service
            .create_order("u1".into(), vec![item("p1", 1, 1.0)])
            .await
            .unwrap();

        let err = service
            .update_order_status(&created.id, Some("refunded"))
            .await
            .unwrap_err();
        assert_eq!(validation_message(err), INVALID_STATUS_MESSAGE);

        let stored = service.get_order(&created.id).await.unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_update_invalid_status_wins_over_missing_order() {
        let (service, _) = service();

        let err = service
            .update_order_status("missing", Some("bogus"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_with_empty_status_refreshes_timestamp_only() {
        let (service, _) = service();
        let created = service
            .create_order("u1".into(), vec![item("p1", 1, 1.0)])
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = service
            .update_order_status(&created.id, Some(""))
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Pending);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_status_update_preserves_total() {
        let (service, _) = service();
        let created = service
            .create_order("u1".into(), vec![item("p1", 2, 10.0)])
            .await
            .unwrap();

        let updated = service
            .update_order_status(&created.id, Some("confirmed"))
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Confirmed);
        assert_eq!(updated.total, 20.0);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let (service, _) = service();
        let a = service
            .create_order("u1".into(), vec![item("p1", 1, 1.0)])
            .await
            .unwrap();
        let b = service
            .create_order("u2".into(), vec![item("p2", 1, 1.0)])
            .await
            .unwrap();
        service
            .update_order_status(&b.id, Some("confirmed"))
            .await
            .unwrap();

        let all = service.list_orders(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, a.id);

        assert_eq!(service.list_orders(Some("")).await.unwrap().len(), 2);

        let confirmed = service.list_orders(Some("confirmed")).await.unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, b.id);

        assert!(service.list_orders(Some("nonsense")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_passes_through() {
        let (service, _) = service();

        assert!(matches!(
            service.get_order("x").await,
            Err(OrderError::NotFound(_))
        ));
        assert!(matches!(
            service.update_order_status("x", Some("shipped")).await,
            Err(OrderError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_order("x").await,
            Err(OrderError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_operations_are_counted() {
        let (service, _) = service();
        let _ = service.create_order(String::new(), vec![]).await;
        let _ = service.get_order("x").await;

        let gathered = service.metrics.registry().gather();
        let ops = gathered
            .iter()
            .find(|m| m.name() == "orders_operations_total")
            .unwrap();
        assert_eq!(ops.metric.len(), 2);
    }
}
