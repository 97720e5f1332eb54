use crate::store::StoreError;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Storage failure: {0}")]
    Internal(#[source] StoreError),
}

impl OrderError {
    pub fn validation(message: impl Into<String>) -> Self {
        OrderError::Validation(message.into())
    }
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::Internal(other),
        }
    }
}
