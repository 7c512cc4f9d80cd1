//! REST API and WebSocket server for the hub
//!
//! ## Architecture
//!
//! - **Axum** web framework with Tower middleware
//! - **SnapshotStore** behind the state for persistence
//! - **ViewerRegistry** behind the state for realtime fan-out
//!
//! ## Endpoints
//!
//! - `POST /api/servers/{name}/data` - Snapshot ingestion (key-gated)
//! - `GET /api/servers` - All machines' latest records
//! - `GET /api/servers/{name}` - One machine's latest record
//! - `WS /ws` - Realtime change notifications

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod websocket;

pub use error::{ApiError, ApiResult};
pub use state::ApiState;

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use tracing::info;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:3001")
    pub bind_addr: SocketAddr,

    /// Enable CORS for dashboard
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".parse().unwrap(),
            enable_cors: true,
        }
    }
}

/// Spawn the API server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    info!("starting API server on {}", config.bind_addr);

    // The push route alone is key-gated; rejection happens before the
    // handler, so a bad credential can never touch the store.
    let mut app = Router::new()
        .route(
            "/api/servers/:name/data",
            post(routes::servers::ingest_snapshot).route_layer(
                axum::middleware::from_fn_with_state(
                    state.clone(),
                    middleware::auth::require_api_key,
                ),
            ),
        )
        .route("/api/servers", get(routes::servers::list_servers))
        .route("/api/servers/:name", get(routes::servers::get_server))
        .route("/ws", get(websocket::websocket_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    // Spawn server in background; connect info feeds the stored origin address
    tokio::spawn(async move {
        if let Err(e) = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
