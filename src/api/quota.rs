//! Quota-window trigger sequence.
//!
//! Usage accounting on the server only opens a new five-hour window when
//! a message is actually sent. When the usage endpoint reports a window
//! with no reset time, this sequence forces one open: create a throwaway
//! conversation, send the smallest possible message, and read the new
//! window's reset instant from the `message_limit` event in the reply
//! stream.
//!
//! The two calls are strictly ordered and share no retry logic; if the
//! message send fails, the conversation from step one is left orphaned
//! on the server, which is accepted.

use chrono::DateTime;
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use uuid::Uuid;

use super::client::{ApiClient, ApiError};
use super::sse;
use super::types::{CompletionRequest, CreateConversationRequest, CreateConversationResponse};

/// Parent id marking the first message of a conversation
pub const FIRST_MESSAGE_PARENT_UUID: &str = "00000000-0000-4000-8000-000000000000";

/// Smallest prompt that still opens a quota window; content is incidental
const TRIGGER_PROMPT: &str = "Hi";

const RENDERING_MODE: &str = "messages";
const SSE_ACCEPT: &str = "text/event-stream";

/// Error bodies are captured for diagnosis but kept short
const ERROR_BODY_LIMIT: usize = 300;

/// Force a new quota window; returns its reset instant in epoch seconds.
///
/// Creates one conversation and one message on the remote account. There
/// is no internal retry: callers deciding to retry (e.g. after renewing
/// credentials) re-run the whole sequence.
pub async fn trigger_new_period(client: &ApiClient, timezone: &str) -> Result<i64, ApiError> {
    let conversation_id = create_conversation(client).await?;
    log::debug!("Created trigger conversation {conversation_id}");

    let stream = request_completion(client, &conversation_id, timezone).await?;
    let resets_at = sse::message_limit_resets_at(&stream)?;

    if let Some(instant) = DateTime::from_timestamp(resets_at, 0) {
        log::info!("New quota window open; resets at {instant}");
    }
    Ok(resets_at)
}

/// Step one: create an ephemeral, unnamed conversation.
async fn create_conversation(client: &ApiClient) -> Result<String, ApiError> {
    let request = CreateConversationRequest {
        uuid: Uuid::new_v4().to_string(),
        name: String::new(),
        include_conversation_preferences: false,
        is_temporary: true,
    };

    let response = client
        .request(Method::POST, "/chat_conversations")?
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::CREATED {
        return Err(http_error(status, response).await);
    }

    let body = response.text().await?;
    let created: CreateConversationResponse = serde_json::from_str(&body)
        .map_err(|e| ApiError::Parse(format!("malformed conversation response: {e}")))?;
    Ok(created.uuid)
}

/// Step two: send the minimal first message and buffer the event stream.
async fn request_completion(
    client: &ApiClient,
    conversation_id: &str,
    timezone: &str,
) -> Result<String, ApiError> {
    let request = CompletionRequest {
        prompt: TRIGGER_PROMPT.to_string(),
        parent_message_uuid: FIRST_MESSAGE_PARENT_UUID.to_string(),
        timezone: timezone.to_string(),
        rendering_mode: RENDERING_MODE.to_string(),
    };

    let response = client
        .request(
            Method::POST,
            &format!("/chat_conversations/{conversation_id}/completion"),
        )?
        .header(ACCEPT, SSE_ACCEPT)
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(http_error(status, response).await);
    }

    Ok(response.text().await?)
}

async fn http_error(status: StatusCode, response: reqwest::Response) -> ApiError {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    ApiError::Http {
        status: status.as_u16(),
        body: truncate_body(body),
    }
}

fn truncate_body(body: String) -> String {
    if body.len() <= ERROR_BODY_LIMIT {
        return body;
    }
    let mut end = ERROR_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
