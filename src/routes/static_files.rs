//! Static File Serving
//!
//! Serves the browser client from the configured static directory. Any GET
//! that does not match a file gets `index.html`, or a built-in page when the
//! directory has none.

use axum::{
    Router,
    extract::State,
    handler::Handler,
    response::{Html, IntoResponse},
};
use tower_http::services::ServeDir;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Create router for serving static files
pub fn router(static_dir: PathBuf) -> Router {
    if static_dir.is_dir() {
        info!(path = %static_dir.display(), "Serving static files");
    } else {
        warn!(path = %static_dir.display(), "Static files directory not found, serving built-in page");
    }

    let index_path = static_dir.join("index.html");
    let serve_dir = ServeDir::new(&static_dir)
        .append_index_html_on_directories(true)
        .fallback(serve_index.with_state(index_path));

    Router::new().fallback_service(serve_dir)
}

/// Serve the index page
async fn serve_index(State(index_path): State<PathBuf>) -> impl IntoResponse {
    match read_index(&index_path).await {
        Some(content) => Html(content),
        None => Html(FALLBACK_HTML.to_string()),
    }
}

async fn read_index(path: &Path) -> Option<String> {
    tokio::fs::read_to_string(path).await.ok()
}

const FALLBACK_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>doc-qa - API Server</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 760px;
            margin: 0 auto;
            padding: 40px 20px;
            color: #222;
        }
        code { background: #f0f0f0; padding: 2px 6px; border-radius: 4px; }
        pre { background: #f6f6f6; padding: 14px; border-radius: 6px; overflow-x: auto; }
    </style>
</head>
<body>
    <h1>doc-qa</h1>
    <p>The server is running, but no <code>index.html</code> was found in the static directory
       (set <code>STATIC_DIR</code> to point at the browser client).</p>

    <h3>API Endpoints</h3>
    <ul>
        <li><code>POST /upload</code> - multipart field <code>file</code> (PDF, XLSX or XLS, up to 5 MiB)</li>
        <li><code>POST /ask</code> - JSON <code>{"content": "...", "question": "..."}</code></li>
        <li><code>GET /api/health</code> - health check</li>
    </ul>

    <h4>Example:</h4>
    <pre>curl -F "file=@report.pdf;type=application/pdf" http://localhost:5001/upload

curl -X POST http://localhost:5001/ask \
  -H "Content-Type: application/json" \
  -d '{"content": "Paris is the capital of France.", "question": "What is the capital of France?"}'</pre>
</body>
</html>"#;
