use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::store::OrderStore;

// ============================================================================
// Health Reporter
// ============================================================================
//
// Liveness and overall health never look at order data. Readiness pings the
// backing store when there is one; the health-only variant has none and is
// always ready.
//
// ============================================================================

pub const SERVICE_NAME: &str = "orders-api";

/// Readiness of the backing store
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    #[cfg(test)]
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: f64,
}

pub struct HealthReporter {
    started_at: Instant,
    store: Option<Arc<dyn OrderStore>>,
}

impl HealthReporter {
    pub fn new(store: Option<Arc<dyn OrderStore>>) -> Self {
        Self {
            started_at: Instant::now(),
            store,
        }
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    pub fn report(&self) -> HealthReport {
        HealthReport {
            status: "healthy",
            service: SERVICE_NAME,
            timestamp: Utc::now(),
            uptime_seconds: self.uptime_seconds(),
        }
    }

    pub async fn readiness(&self) -> HealthStatus {
        let Some(store) = &self.store else {
            return HealthStatus::Healthy;
        };

        match store.ping().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                tracing::warn!(backend = store.backend(), error = %e, "Readiness check failed");
                HealthStatus::Unhealthy(e.to_string())
            }
        }
    }
}
