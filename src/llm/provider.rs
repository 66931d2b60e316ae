use std::time::Duration;

use async_trait::async_trait;
use crate::config::LLMConfig;
use crate::llm::google::GoogleAdapter;
use crate::types::{LLMRequest, LLMResponse, AppResult};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    model: String,
}

impl LLM {
    pub fn new(config: &LLMConfig) -> anyhow::Result<Self> {
        let adapter = GoogleAdapter::with_base_url(
            &config.google_api_key,
            &config.api_base,
            config.timeout_secs.map(Duration::from_secs),
        )?;

        Ok(Self::with_adapter(Box::new(adapter), &config.model))
    }

    /// Wrap an arbitrary adapter, e.g. a scripted one in tests.
    pub fn with_adapter(adapter: Box<dyn LLMAdapter>, model: &str) -> Self {
        Self {
            adapter,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}
