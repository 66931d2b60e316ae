// Google Gemini adapter
// API Reference: https://ai.google.dev/api/generate-content
//
// Uses the REST `generateContent` endpoint with the API key passed as the
// `key` query parameter. Streaming (`streamGenerateContent`) is not used.

use std::time::Duration;

use crate::config::DEFAULT_GEMINI_API_BASE;
use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub struct GoogleAdapter {
    client: Client,
    api_key: String,
    api_base: String,
}

// Request types for the Gemini API
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

// Response types for the Gemini API
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Deserialize)]
struct GeminiError {
    #[serde(default)]
    code: Option<u16>,
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GoogleAdapter {
    /// Create an adapter against the public Gemini endpoint with no request timeout.
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
        }
    }

    /// Create an adapter against a custom base URL (proxies, mock servers).
    /// `timeout` bounds the whole request; `None` relies on transport defaults.
    pub fn with_base_url(api_key: &str, api_base: &str, timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }

    fn build_request(request: &LLMRequest) -> GeminiRequest {
        let contents = request
            .messages
            .iter()
            .map(|m| GeminiContent {
                role: Some(m.role.clone()),
                parts: vec![GeminiPart { text: m.content.clone() }],
            })
            .collect();

        let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            })
        } else {
            None
        };

        GeminiRequest {
            contents,
            generation_config,
        }
    }

    /// Pull the first candidate's first text part out of a `generateContent` body.
    fn parse_response(body: &str) -> AppResult<LLMResponse> {
        let response: GeminiResponse = serde_json::from_str(body)
            .map_err(|e| AppError::LLMApi(format!("Failed to parse Gemini response: {}", e)))?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LLMApi("Gemini returned no candidates".to_string()))?;

        let content = candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                AppError::LLMApi(format!(
                    "Gemini candidate has no text (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ))
            })?;

        let usage = response
            .usage_metadata
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        Ok(LLMResponse {
            content,
            finish_reason: candidate.finish_reason.unwrap_or_else(|| "STOP".to_string()),
            usage,
        })
    }
}

#[async_trait]
impl LLMAdapter for GoogleAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let url = self.endpoint(&request.model);
        debug!(model = %request.model, "Sending Gemini generateContent request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::build_request(request))
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::LLMApi(format!("Failed to read Gemini response: {}", e)))?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&body) {
                return Err(AppError::LLMApi(format!(
                    "Gemini API error ({}): {} (code: {:?}, status: {:?})",
                    status,
                    error_response.error.message,
                    error_response.error.code,
                    error_response.error.status
                )));
            }

            return Err(AppError::LLMApi(format!("Gemini API error ({}): {}", status, body)));
        }

        Self::parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LLMMessage;
    use mockito::Matcher;

    fn sample_request() -> LLMRequest {
        LLMRequest {
            model: "gemini-test".to_string(),
            messages: vec![LLMMessage::user("Context: x\n\nQuestion: y")],
            max_tokens: Some(256),
            temperature: Some(0.7),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GoogleAdapter::build_request(&sample_request())).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Context: x\n\nQuestion: y");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let adapter = GoogleAdapter::with_base_url("k", "http://localhost:1234/v1beta/", None).unwrap();
        assert_eq!(
            adapter.endpoint("gemini-pro"),
            "http://localhost:1234/v1beta/models/gemini-pro:generateContent"
        );
        assert_eq!(
            GoogleAdapter::new("k").endpoint("gemini-pro"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_parse_response_takes_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Paris"}, {"text": "ignored"}], "role": "model"}, "finishReason": "STOP"},
                {"content": {"parts": [{"text": "Lyon"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 1, "totalTokenCount": 13}
        }"#;

        let response = GoogleAdapter::parse_response(body).unwrap();
        assert_eq!(response.content, "Paris");
        assert_eq!(response.finish_reason, "STOP");
        assert_eq!(response.usage.total_tokens, 13);
    }

    #[test]
    fn test_parse_response_rejects_malformed_shapes() {
        assert!(GoogleAdapter::parse_response(r#"{"candidates": []}"#).is_err());
        assert!(GoogleAdapter::parse_response(r#"{}"#).is_err());
        assert!(GoogleAdapter::parse_response(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).is_err());
        assert!(GoogleAdapter::parse_response(r#"{"candidates": [{"content": {"parts": [{}]}}]}"#).is_err());
        assert!(GoogleAdapter::parse_response("not json").is_err());
    }

    #[tokio::test]
    async fn test_sends_key_and_reads_answer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "generationConfig": {"maxOutputTokens": 256}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"42"}]}}]}"#)
            .create_async()
            .await;

        let adapter = GoogleAdapter::with_base_url("test-key", &format!("{}/v1beta", server.url()), None).unwrap();
        let response = adapter.create_chat_completion(&sample_request()).await.unwrap();

        assert_eq!(response.content, "42");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#)
            .create_async()
            .await;

        let adapter = GoogleAdapter::with_base_url("bad-key", &format!("{}/v1beta", server.url()), None).unwrap();
        let err = adapter.create_chat_completion(&sample_request()).await.unwrap_err();

        match err {
            AppError::LLMApi(detail) => assert!(detail.contains("API key not valid")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
