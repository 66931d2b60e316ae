//! `POST /ask` - answer a question about previously extracted content
//!
//! Stateless: the client resends the full document text with every question.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, warn};

use crate::models::{AppState, AskRequest, AskResponse};
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};

pub const ASK_TEMPERATURE: f32 = 0.7;
pub const ASK_MAX_OUTPUT_TOKENS: u32 = 256;

/// Extracted text from a 5 MiB upload can exceed axum's 2 MB default.
pub const MAX_ASK_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/api/ask", post(ask))
        .layer(DefaultBodyLimit::max(MAX_ASK_BODY_BYTES))
        .with_state(state)
}

pub fn build_prompt(content: &str, question: &str) -> String {
    format!("Context: {}\n\nQuestion: {}", content, question)
}

async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> AppResult<Json<AskResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::RequestTooLarge;
        }
        warn!("Unreadable ask body: {}", rejection.body_text());
        AppError::MissingContentOrQuestion
    })?;

    let (content, question) = match (request.content, request.question) {
        (Some(content), Some(question)) if !content.is_empty() && !question.is_empty() => {
            (content, question)
        }
        _ => return Err(AppError::MissingContentOrQuestion),
    };

    info!(
        content_bytes = content.len(),
        question = %question,
        "Asking {}", state.llm.model()
    );

    let llm_request = LLMRequest {
        model: state.llm.model().to_string(),
        messages: vec![LLMMessage::user(build_prompt(&content, &question))],
        max_tokens: Some(ASK_MAX_OUTPUT_TOKENS),
        temperature: Some(ASK_TEMPERATURE),
    };

    let response = state.llm.create_chat_completion(&llm_request).await?;

    info!(
        finish_reason = %response.finish_reason,
        total_tokens = response.usage.total_tokens,
        "AI response received"
    );
    Ok(Json(AskResponse {
        answer: response.content,
    }))
}
