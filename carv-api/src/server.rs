//! API server configuration and lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use carv_store::CoinStore;

use crate::routes;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address.
    pub listen_addr: SocketAddr,
    /// Enable permissive CORS (read-only API, any origin).
    pub cors_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".parse().expect("static address"),
            cors_enabled: true,
        }
    }
}

/// Bind and serve the query API until the process exits.
pub async fn serve(config: ApiConfig, store: Arc<CoinStore>) -> std::io::Result<()> {
    let mut router = routes::router(store).layer(TraceLayer::new_for_http());
    if config.cors_enabled {
        router = router.layer(
            CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_origin(Any),
        );
    }

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("API server listening on {}", config.listen_addr);
    axum::serve(listener, router).await
}
