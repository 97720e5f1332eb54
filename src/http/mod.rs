// ============================================================================
// HTTP Layer - Routing, Handlers, Envelopes
// ============================================================================
//
// Route table:
//   GET          /health, /orders/health   -> health
//   GET          /orders/health/live       -> liveness
//   GET          /orders/health/ready      -> readiness
//   GET|POST     /orders, /orders/         -> list | create
//   GET|PUT|DEL  /orders/{id}              -> get | update | delete
//
// Health resources are registered first so they win over /orders/{id}.
// An item or health path with an unsupported verb answers 405. The
// collection path with any verb besides GET/POST, and every unmatched path,
// get the app-level `not_found` body.
//
// ============================================================================

pub mod handlers;
pub mod responses;

use actix_web::web;

/// Health routes only. This is the whole route table of the health-only
/// variant.
pub fn configure_health(cfg: &mut web::ServiceConfig) {
    for path in ["/health", "/orders/health"] {
        cfg.service(
            web::resource(path)
                .route(web::get().to(handlers::health))
                .default_service(web::to(handlers::method_not_allowed)),
        );
    }

    cfg.service(
        web::resource("/orders/health/live")
            .route(web::get().to(handlers::liveness))
            .default_service(web::to(handlers::method_not_allowed)),
    )
    .service(
        web::resource("/orders/health/ready")
            .route(web::get().to(handlers::readiness))
            .default_service(web::to(handlers::method_not_allowed)),
    );
}

/// Full route table: health first, then the order collection and items.
pub fn configure_orders(cfg: &mut web::ServiceConfig) {
    configure_health(cfg);

    // Only GET and POST exist on the collection; other verbs fall through
    // to not_found rather than 405.
    for path in ["/orders", "/orders/"] {
        cfg.service(
            web::resource(path)
                .route(web::get().to(handlers::list_orders))
                .route(web::post().to(handlers::create_order))
                .default_service(web::to(handlers::not_found)),
        );
    }

    // `{id}` never spans a `/`, so nested paths fall through to not_found.
    for path in ["/orders/{id}", "/orders/{id}/"] {
        cfg.service(
            web::resource(path)
                .route(web::get().to(handlers::get_order))
                .route(web::put().to(handlers::update_order))
                .route(web::delete().to(handlers::delete_order))
                .default_service(web::to(handlers::method_not_allowed)),
        );
    }
}

// ============================================================================
// Router Tests
// ============================================================================
