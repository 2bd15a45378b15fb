//! HTTP/WebSocket surface of the daemon.
//!
//! Thin glue over the core: `GET /` is a health check, `GET /ws/console`
//! upgrades to a console session. Each session gets its own supervisor, so
//! sessions never share process state.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::bridge::ConsoleSession;
use crate::config::AppConfig;
use crate::supervisor::Supervisor;

pub struct ApiServer {
    config: Arc<AppConfig>,
}

impl ApiServer {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn router(&self) -> Router {
        // The panel frontend is served from another origin, hence the
        // permissive CORS layer.
        Router::new()
            .route("/", get(health_check))
            .route("/ws/console", get(console_ws))
            .with_state(self.config.clone())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    pub async fn start(self) -> Result<()> {
        let addr = self.config.listen_addr.clone();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("listening on http://{}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                tokio::signal::ctrl_c().await.ok();
                tracing::info!("shutdown signal received");
            })
            .await?;
        Ok(())
    }
}

/// GET / - health check, wire-compatible with the original panel backend.
async fn health_check() -> impl IntoResponse {
    Json(json!({ "message": "API is working" }))
}

/// GET /ws/console - upgrade to a console session with a fresh supervisor.
async fn console_ws(
    ws: WebSocketUpgrade,
    State(config): State<Arc<AppConfig>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let supervisor = Supervisor::new(config.servers_root.clone(), config.java_bin.clone());
        ConsoleSession::new(supervisor).run(socket).await;
    })
}
