#[path = "notion_gateway/handlers.rs"]
mod handlers;
#[path = "notion_gateway/state.rs"]
mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use rewrite_module::config::AppConfig;

use handlers::{health, notion_webhook};
use state::GatewayState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_target(false).init();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let port = config.port;
    let state = Arc::new(GatewayState::new(config));

    let app = Router::new()
        .route("/health", get(health))
        .route("/webhook/notion", post(notion_webhook))
        .with_state(state);

    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    info!("notion rewriter listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
