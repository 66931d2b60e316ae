//! API Routes
//! 
//! This module organizes all HTTP endpoints for the application:
//! - `/upload` (`/api/upload`) - Extract text from an uploaded PDF or spreadsheet
//! - `/ask` (`/api/ask`) - Answer a question about extracted text
//! - `/api/health` - Health checks
//! - everything else - Static file serving (frontend)

pub mod ask;
pub mod health;
pub mod upload;
pub mod static_files;

use axum::Router;
use tower_http::trace::TraceLayer;
use crate::middleware::apply_cors;
use crate::models::AppState;
use tracing::info;

/// Create the main application router
/// 
/// Routes are organized as follows:
/// - Upload and ask are reachable both at the root and under `/api/`,
///   since the bundled browser client posts to relative `api/...` paths
/// - Any other GET serves a static file, falling back to index.html
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");
    
    let api_router = Router::new()
        .merge(upload::router())
        .merge(ask::router(state.clone()))
        .merge(health::router(state.clone()));

    // API routes take precedence over static files
    let app = Router::new()
        .merge(api_router)
        .merge(static_files::router(state.config.server.static_dir.clone()));

    apply_cors(app, &state.config.server.cors_allowed_origins)
        .layer(TraceLayer::new_for_http())
}
