use std::sync::Arc;

use crate::config::Config;
use crate::llm::LLM;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm: Arc<LLM>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let llm = LLM::new(&config.llm)?;
        Ok(Self {
            config,
            llm: Arc::new(llm),
        })
    }
}

// Request/response bodies for the HTTP surface

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UploadResponse {
    pub content: String,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub model: String,
}
