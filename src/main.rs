use std::env;
use std::sync::Arc;

use pantry_match::client::RecipeClient;
use pantry_match::server::{PantryMcpServer, SharedState};
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get configuration from environment variables
    let base_url = env::var("RECIPE_API_BASE_URL")
        .unwrap_or_else(|_| "https://www.themealdb.com/api/json/v1".to_string());

    let api_key = env::var("RECIPE_API_KEY").unwrap_or_else(|_| "1".to_string());

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3001".to_string());

    let client = Arc::new(RecipeClient::new(base_url.clone(), api_key));
    let state = SharedState::default();

    tracing::info!("Checking recipe database at {}...", base_url);
    let probe = PantryMcpServer::with_state(client.clone(), state.clone());
    if let Err(e) = probe.test_api_access().await {
        tracing::warn!("Recipe database check failed: {}", e);
        tracing::warn!("The server will continue, but recipe search and suggestions may fail.");
        tracing::warn!("  - RECIPE_API_BASE_URL is: {}", base_url);
        tracing::warn!("  - Check RECIPE_API_KEY and network access");
    }

    // Create server configuration and start SSE server
    let config = SseServerConfig {
        bind: bind_addr.parse()?,
        sse_path: "/sse".to_string(),
        post_path: "/message".to_string(),
        ct: tokio_util::sync::CancellationToken::new(),
        sse_keep_alive: None,
    };

    tracing::info!("Pantry MCP Server listening on {}", config.bind);

    // serve_with_config handles binding, axum server setup, and graceful shutdown internally
    let sse_server = SseServer::serve_with_config(config).await?;

    // Every connection gets its own service over the same pantry and recipe book
    let ct = sse_server.with_service(move || {
        PantryMcpServer::with_state(client.clone(), state.clone())
    });

    tracing::info!("Pantry MCP Server started successfully");

    // Wait for Ctrl+C
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");
    ct.cancel();

    Ok(())
}
