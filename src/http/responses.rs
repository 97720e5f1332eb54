use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::domain::order::OrderError;
use crate::models::Order;

// ============================================================================
// Response Envelopes
// ============================================================================

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub total: usize,
}

impl From<Vec<Order>> for OrderListResponse {
    fn from(orders: Vec<Order>) -> Self {
        Self {
            total: orders.len(),
            orders,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

impl MessageResponse {
    pub fn with_order(message: &'static str, order: Order) -> Self {
        Self {
            message,
            order: Some(order),
        }
    }

    pub fn message(message: &'static str) -> Self {
        Self {
            message,
            order: None,
        }
    }
}

/// Body for unmatched routes. Deliberately a different shape from `ErrorBody`.
#[derive(Debug, Serialize)]
pub struct RouteNotFound {
    pub status: u16,
    pub error: &'static str,
    pub message: String,
}

impl RouteNotFound {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            status: 404,
            error: "Not Found",
            message: format!("Route {} {} not found", method, path),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// API Errors
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Order not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn invalid_json() -> Self {
        ApiError::Validation("Invalid JSON body".to_string())
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound => "ORDER_NOT_FOUND",
            ApiError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ApiError::Internal => "INTERNAL_ERROR",
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(message) => ApiError::Validation(message),
            OrderError::NotFound(_) => ApiError::NotFound,
            OrderError::Internal(source) => {
                tracing::error!(error = %source, "Order storage failure");
                ApiError::Internal
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            code: self.code(),
        })
    }
}
