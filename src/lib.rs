// doc-qa - upload a document, extract its text, ask an LLM about it

pub mod config;
pub mod models;
pub mod types;
pub mod extract;   // PDF and spreadsheet text extraction
pub mod llm;
pub mod routes;
pub mod middleware;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
