use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use doc_qa::{config::Config, routes::create_router, utils::init_logger, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config);
    if config.llm.google_api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; /ask requests will fail upstream");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    // Create shared state
    let state = AppState::new(config)?;

    // Create router
    let app = create_router(state);

    // Start server
    let listener = TcpListener::bind(addr).await?;
    info!("Server is running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
