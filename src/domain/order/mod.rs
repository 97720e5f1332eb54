// ============================================================================
// Order Domain
// ============================================================================
//
// - Errors (OrderError enum)
// - Service (OrderService: validation, totals, store delegation)
//
// ============================================================================

pub mod errors;
pub mod service;

pub use errors::*;
pub use service::*;
