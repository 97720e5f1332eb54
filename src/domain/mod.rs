// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Validation and derived-field rules for orders. Persistence lives in
// crate::store; this layer only talks to the `OrderStore` trait.
//
// ============================================================================

pub mod order;
