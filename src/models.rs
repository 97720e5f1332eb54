use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Domain Models
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line entry of an order. Numeric fields are signed so that
/// non-positive input survives decoding and is rejected by validation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub price: f64,
}

impl OrderItem {
    pub fn new(product_id: impl Into<String>, quantity: i64, price: f64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            price,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.price * self.quantity as f64
    }

    pub fn is_valid(&self) -> bool {
        !self.product_id.is_empty() && self.quantity > 0 && self.price > 0.0
    }
}

impl Order {
    /// Build a fresh `pending` order with a new id and the total computed
    /// from `items`.
    pub fn new(user_id: impl Into<String>, items: Vec<OrderItem>) -> Self {
        let now = Utc::now();
        let total = calculate_total(&items);

        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            items,
            total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// Apply a status-only update. `None` keeps the status but still
    /// refreshes `updated_at`.
    pub fn apply_status(&mut self, status: Option<OrderStatus>) {
        if let Some(status) = status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}

pub fn calculate_total(items: &[OrderItem]) -> f64 {
    items.iter().map(OrderItem::subtotal).sum()
}

// ============================================================================
// Order Status
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    #[cfg(test)]
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
