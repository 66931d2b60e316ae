// Type definitions and the error taxonomy shared by the handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "model"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFileUploaded,

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File too large")]
    FileTooLarge,

    #[error("Missing content or question")]
    MissingContentOrQuestion,

    #[error("Request body too large")]
    RequestTooLarge,

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("LLM API error: {0}")]
    LLMApi(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NoFileUploaded
            | AppError::UnsupportedFileType(_)
            | AppError::MissingContentOrQuestion => StatusCode::BAD_REQUEST,
            AppError::FileTooLarge | AppError::RequestTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Extraction(_) | AppError::LLMApi(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the client. Processing errors never carry their detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::NoFileUploaded => "No file uploaded",
            AppError::UnsupportedFileType(_) => "Unsupported file type",
            AppError::FileTooLarge => "File too large",
            AppError::MissingContentOrQuestion => "Missing content or question",
            AppError::RequestTooLarge => "Request body too large",
            AppError::Extraction(_) => "Failed to process the file",
            AppError::LLMApi(_) => "Failed to get AI response",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Extraction(detail) => error!("Error processing file: {}", detail),
            AppError::LLMApi(detail) => error!("Error querying Gemini: {}", detail),
            other => warn!(status = status.as_u16(), "Rejected request: {}", other),
        }

        let body = crate::models::ErrorResponse {
            error: self.public_message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
