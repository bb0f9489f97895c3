use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Body for `POST /api/organizations/{orgId}/chat_conversations`
#[derive(Debug, Clone, Serialize)]
pub struct CreateConversationRequest {
    /// Client-generated id for the new conversation
    pub uuid: String,
    /// Empty: the conversation is never shown anywhere
    pub name: String,
    pub include_conversation_preferences: bool,
    pub is_temporary: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateConversationResponse {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
}

/// Body for `POST .../chat_conversations/{id}/completion`
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub parent_message_uuid: String,
    pub timezone: String,
    pub rendering_mode: String,
}

/// Payload of the `message_limit` SSE event
#[derive(Debug, Clone, Deserialize)]
pub struct MessageLimitEvent {
    pub message_limit: Option<MessageLimitDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageLimitDetail {
    #[serde(default)]
    pub windows: HashMap<String, LimitWindow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitWindow {
    pub status: Option<String>,
    /// Epoch seconds at which the window's quota resets
    pub resets_at: Option<i64>,
}
