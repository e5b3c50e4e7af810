use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::{AllowedOrigins, Settings};
use crate::{Error, Result};

pub mod routes;

/// Server state. Immutable; each request opens its own connection.
pub struct AppState {
    pub database: String,
    pub table: String,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            database: settings.database.clone(),
            table: settings.table.clone(),
        }
    }
}

/// CORS policy for the configured origins.
pub fn cors_layer(origins: &AllowedOrigins) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD])
        .allow_headers(Any);

    match origins {
        AllowedOrigins::Any => Ok(layer.allow_origin(Any)),
        AllowedOrigins::List(list) => {
            let values = list
                .iter()
                .map(|origin| {
                    HeaderValue::from_str(origin).map_err(|_| {
                        Error::Config(format!("invalid allowed origin '{}'", origin))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(layer.allow_origin(AllowOrigin::list(values)))
        }
    }
}

pub fn build_router(state: Arc<AppState>, cors: CorsLayer, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/search", get(routes::search))
        .route("/api/get", get(routes::get_account))
        .route_service(
            "/account-search",
            ServeFile::new(static_dir.join("index.html")),
        )
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(settings: Settings) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_settings(&settings));
    let cors = cors_layer(&settings.allowed_origins)?;
    let app = build_router(state, cors, &settings.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!(
        "Starting server on {} (table '{}', database '{}')",
        addr,
        settings.table,
        settings.database
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
