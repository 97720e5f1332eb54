use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod domain;
mod health;
mod http;
mod metrics;
mod models;
mod store;

use config::{Backend, Config};
use domain::order::OrderService;
use health::HealthReporter;
use store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,orders_api=debug")),
        )
        .init();

    tracing::info!(
        backend = config.backend.as_str(),
        port = config.port,
        metrics_port = ?config.metrics_port,
        "🚀 Starting orders-api"
    );

    let metrics = Arc::new(metrics::Metrics::new()?);

    // === 1. Order store for the selected backend ===
    let store: Option<Arc<dyn OrderStore>> = match config.backend {
        Backend::Memory => {
            let store = if config.seed_data {
                InMemoryOrderStore::seeded()
            } else {
                InMemoryOrderStore::new()
            };
            tracing::info!(orders = store.len().await, "Using in-memory order store");
            Some(Arc::new(store))
        }
        Backend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let store = PostgresOrderStore::connect(url, config.db_max_connections)
                .await
                .context("failed to connect to Postgres")?;
            Some(Arc::new(store))
        }
        Backend::HealthOnly => {
            tracing::info!("Health-only mode, order routes disabled");
            None
        }
    };

    // === 2. Service + health reporter shared by every worker ===
    let service = store
        .clone()
        .map(|store| web::Data::from(Arc::new(OrderService::new(store, metrics.clone()))));
    let health = web::Data::new(HealthReporter::new(store));

    // === 3. HTTP server ===
    let api = HttpServer::new(move || {
        let app = App::new()
            .wrap(middleware::Logger::default())
            .app_data(health.clone())
            .default_service(web::to(http::handlers::not_found));

        match &service {
            Some(service) => app
                .app_data(service.clone())
                .configure(http::configure_orders),
            None => app.configure(http::configure_health),
        }
    })
    .bind(("0.0.0.0", config.port))
    .with_context(|| format!("failed to bind port {}", config.port))?
    .run();

    tracing::info!("Orders API running on port {}", config.port);

    // === 4. Optional metrics listener ===
    match config.metrics_port {
        Some(port) => {
            let registry = metrics.registry().clone();
            futures_util::future::try_join(api, metrics::start_metrics_server(registry, port))
                .await?;
        }
        None => api.await?,
    }

    tracing::info!("Orders API stopped");
    Ok(())
}
