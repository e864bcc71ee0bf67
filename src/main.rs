//! TramiteSAT backend entry point.
//!
//! Wires configuration, the PostgreSQL pool, the MercadoPago client, and the
//! payment HTTP routes into a single Axum server.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tramitesat::adapters::http::payment::{payment_router, PaymentAppState};
use tramitesat::adapters::mercadopago::{MercadoPagoClient, MercadoPagoClientConfig};
use tramitesat::adapters::postgres::{
    PostgresPaymentStore, PostgresProfileStore, PostgresUnlockStore,
};
use tramitesat::application::handlers::payment::RedirectUrls;
use tramitesat::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    tracing::info!(
        environment = ?config.server.environment,
        sandbox = config.mercadopago.is_sandbox(),
        "iniciando tramitesat"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("aplicando migraciones");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let gateway = MercadoPagoClient::new(MercadoPagoClientConfig::from_config(
        &config.mercadopago,
    ))?;

    let state = PaymentAppState {
        payments: Arc::new(PostgresPaymentStore::new(pool.clone())),
        unlocks: Arc::new(PostgresUnlockStore::new(pool.clone())),
        profiles: Arc::new(PostgresProfileStore::new(pool)),
        gateway: Arc::new(gateway),
        webhook_secret: SecretString::new(config.mercadopago.webhook_secret.clone()),
        urls: RedirectUrls::new(config.app.base_url_trimmed()),
    };

    let cors = build_cors_layer(&config);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/pagos", payment_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors);

    let addr = config.server.bind_addr()?;
    tracing::info!(%addr, "servidor escuchando");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = config.server.cors_origins_list();
    if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    }
}
