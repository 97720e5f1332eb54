use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::responses::{
    ApiError, MessageResponse, OrderListResponse, OrderResponse, ReadinessResponse, RouteNotFound,
};
use crate::domain::order::OrderService;
use crate::health::{HealthReporter, HealthStatus};
use crate::models::OrderItem;

// ============================================================================
// Request Bodies
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        ApiError::invalid_json()
    })
}

// ============================================================================
// Order Handlers
// ============================================================================

/// First `status` value of the query string. Later repeats are ignored.
fn status_filter(query_string: &str) -> Result<Option<String>, ApiError> {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(query_string).map_err(|e| {
        tracing::debug!(error = %e, "Rejected query string");
        ApiError::Validation("Invalid query string".to_string())
    })?;

    Ok(pairs
        .into_inner()
        .into_iter()
        .find(|(key, _)| key == "status")
        .map(|(_, value)| value))
}

pub async fn list_orders(
    service: web::Data<OrderService>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let filter = status_filter(req.query_string())?;
    let orders = service.list_orders(filter.as_deref()).await?;

    Ok(HttpResponse::Ok().json(OrderListResponse::from(orders)))
}

pub async fn get_order(
    service: web::Data<OrderService>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let order = service.get_order(&id).await?;

    Ok(HttpResponse::Ok().json(OrderResponse { order }))
}

pub async fn create_order(
    service: web::Data<OrderService>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let request: CreateOrderRequest = parse_body(&body)?;
    let order = service.create_order(request.user_id, request.items).await?;

    Ok(HttpResponse::Created().json(MessageResponse::with_order(
        "Order created successfully",
        order,
    )))
}

pub async fn update_order(
    service: web::Data<OrderService>,
    id: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let request: UpdateOrderRequest = parse_body(&body)?;
    let order = service
        .update_order_status(&id, request.status.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::with_order(
        "Order updated successfully",
        order,
    )))
}

pub async fn delete_order(
    service: web::Data<OrderService>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    service.delete_order(&id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::message("Order deleted successfully")))
}

// ============================================================================
// Health Handlers
// ============================================================================

pub async fn health(reporter: web::Data<HealthReporter>) -> HttpResponse {
    HttpResponse::Ok().json(reporter.report())
}

pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "alive" }))
}

pub async fn readiness(reporter: web::Data<HealthReporter>) -> HttpResponse {
    match reporter.readiness().await {
        HealthStatus::Healthy => HttpResponse::Ok().json(ReadinessResponse {
            status: "ready",
            error: None,
        }),
        HealthStatus::Unhealthy(reason) => {
            HttpResponse::ServiceUnavailable().json(ReadinessResponse {
                status: "not ready",
                error: Some(reason),
            })
        }
    }
}

// ============================================================================
// Fallbacks
// ============================================================================

pub async fn method_not_allowed() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed)
}

pub async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(RouteNotFound::new(req.method().as_str(), req.path()))
}
