//! Inventario - Backend Server
//!
//! Multi-tenant inventory API: catalog, warehouses, a signed movement
//! ledger, alerts, dashboard aggregates and CSV reports.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod middleware;
mod routes;
mod services;

pub use config::Config;

/// Pool and configuration handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventario_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!(environment = %config.environment, "Starting Inventario server");

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;
    tracing::debug!(max_connections = config.database.max_connections, "Database pool ready");

    if config.is_development() {
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Schema migrations applied");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db: db_pool,
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Inventario API listening");
    axum::serve(listener, create_app(state)).await?;

    Ok(())
}

/// Root router: public health routes plus the versioned API
fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

async fn root() -> &'static str {
    "Inventario API v1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = Config {
            environment: "test".to_string(),
            server: config::ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
            },
            database: config::DatabaseConfig {
                url: "postgres://inventario@localhost/inventario_test".to_string(),
                max_connections: 1,
                min_connections: 0,
            },
            jwt: config::JwtConfig {
                secret: "test-secret".to_string(),
                access_token_expiry: 3600,
                refresh_token_expiry: 604800,
            },
            auth: config::AuthConfig {
                auto_confirm_email: true,
            },
            ledger: config::LedgerConfig {
                expiring_horizon_days: 30,
                supply_buckets: 6,
                top_products_limit: 5,
            },
        };
        let db = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&config.database.url)
            .unwrap();
        AppState {
            db,
            config: Arc::new(config),
        }
    }

    async fn status_of(request: Request<Body>) -> StatusCode {
        create_app(test_state()).oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_dashboard_requires_a_session() {
        let request = Request::get("/api/v1/dashboard").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_forged_token_is_rejected() {
        let request = Request::get("/api/v1/stock")
            .header(AUTHORIZATION, "Bearer not.a.jwt")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_root_is_public() {
        let request = Request::get("/").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::OK);
    }
}
