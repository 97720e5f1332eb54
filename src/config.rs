use clap::{Parser, ValueEnum};

// ============================================================================
// Configuration
// ============================================================================
//
// Every option can be given as a flag or through the environment; the
// environment is what the container images use.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Insertion-ordered list kept in process memory
    Memory,
    /// Durable `orders` table in Postgres
    Postgres,
    /// Health endpoints only, no order routes
    HealthOnly,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::Postgres => "postgres",
            Backend::HealthOnly => "health-only",
        }
    }
}

/// Command-line arguments for the orders service.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Order management HTTP service", long_about = None)]
pub struct Config {
    /// Port the API listens on
    #[arg(long, env = "PORT", default_value_t = 8083)]
    pub port: u16,

    /// Which order store to run with
    #[arg(long, env = "ORDERS_BACKEND", value_enum, default_value_t = Backend::Memory)]
    pub backend: Backend,

    /// Postgres connection string (postgres backend only)
    #[arg(long, env = "DATABASE_URL", required_if_eq("backend", "postgres"))]
    pub database_url: Option<String>,

    /// Maximum pooled Postgres connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub db_max_connections: u32,

    /// Seed the in-memory store with demo orders
    #[arg(
        long,
        env = "SEED_DATA",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub seed_data: bool,

    /// Serve Prometheus metrics on this port (disabled when unset)
    #[arg(long, env = "METRICS_PORT")]
    pub metrics_port: Option<u16>,
}
