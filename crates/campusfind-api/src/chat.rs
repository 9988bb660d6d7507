//! Proxy to the generative-text service. The persona prompt is fixed;
//! conversation history is mapped to user/model turns and the whole
//! exchange is forwarded in one request. No state is kept between calls.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::error;

use campusfind_types::api::{ChatRequest, ChatResponse};

use crate::AppState;
use crate::error::ApiError;

const GEMINI_MODEL: &str = "gemini-pro";

const PERSONA_PROMPT: &str = "You are a helpful assistant for CampusFind, a lost and found app for college students.
You help students report lost items, find found items, and answer questions about how the app works.
- Help users understand the process: Report → Smart Scan to match items → Answer security questions
- Be friendly and supportive
- If questions are not related to CampusFind or the lost/found process, politely redirect to the app's purpose
- Keep responses concise and helpful";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::Validation("Missing message".into()));
    }
    let api_key = state
        .gemini_api_key
        .as_deref()
        .ok_or_else(|| ApiError::Configuration("Missing generative API key".into()))?;

    let mut contents: Vec<Content> = req
        .conversation_history
        .iter()
        .map(|turn| Content {
            role: if turn.role == "user" { "user" } else { "model" }.into(),
            parts: vec![Part {
                text: turn.content.clone(),
            }],
        })
        .collect();
    contents.push(Content {
        role: "user".into(),
        parts: vec![Part {
            text: format!("{PERSONA_PROMPT}\n\nUser question: {}", req.message),
        }],
    });

    let url = format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        state.gemini_base_url, GEMINI_MODEL, api_key
    );

    let response = state
        .http
        .post(&url)
        .json(&GenerateRequest { contents })
        .send()
        .await
        .map_err(|e| {
            error!("chat upstream request failed: {e}");
            ApiError::Internal("Failed to process message".into())
        })?;

    if !response.status().is_success() {
        error!("chat upstream returned {}", response.status());
        return Err(ApiError::Internal("Failed to process message".into()));
    }

    let body: GenerateResponse = response.json().await.map_err(|e| {
        error!("chat upstream response unreadable: {e}");
        ApiError::Internal("Failed to process message".into())
    })?;

    let reply = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| {
            error!("chat upstream returned no candidates");
            ApiError::Internal("Failed to process message".into())
        })?;

    Ok(Json(ChatResponse { reply }))
}
