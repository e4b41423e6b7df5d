use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::controllers::{health, voiceover::VoiceoverController};
use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    pool: Arc<Option<DbPool>>,
    voiceover_controller: Arc<VoiceoverController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let voiceover_routes = Router::new()
        .route(
            "/api/voiceovers/regenerate",
            post(VoiceoverController::regenerate),
        )
        .with_state(voiceover_controller);

    let app = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool)
        .merge(voiceover_routes)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
