//! Scan of the completion response stream for the quota-window event.
//!
//! The completion endpoint answers with a newline-delimited
//! Server-Sent-Events body. Only one event matters here: the first
//! `message_limit` event whose `data:` payload carries the five-hour
//! window's reset timestamp. The body is fully buffered before the scan,
//! so this is a plain line walk rather than a streaming parser.

use super::client::ApiError;
use super::types::MessageLimitEvent;

const MESSAGE_LIMIT_MARKER: &str = "event: message_limit";
const EVENT_PREFIX: &str = "event: ";
const DATA_PREFIX: &str = "data: ";
const FIVE_HOUR_WINDOW: &str = "5h";

/// The first `data:` payload following a `message_limit` marker, or
/// `None` when the marker never appears or has no payload line before
/// the next event begins.
pub(crate) fn message_limit_payload(stream: &str) -> Option<&str> {
    let mut awaiting_data = false;
    for line in stream.lines() {
        let line = line.trim_end_matches('\r');
        if line == MESSAGE_LIMIT_MARKER {
            awaiting_data = true;
            continue;
        }
        if !awaiting_data {
            continue;
        }
        if let Some(payload) = line.strip_prefix(DATA_PREFIX) {
            return Some(payload);
        }
        if line.starts_with(EVENT_PREFIX) {
            // Another event began before any data line; that marker had
            // no payload. Keep scanning for a later marker.
            awaiting_data = false;
        }
    }
    None
}

/// Extract the five-hour window's reset timestamp (epoch seconds).
pub(crate) fn message_limit_resets_at(stream: &str) -> Result<i64, ApiError> {
    let payload = message_limit_payload(stream).ok_or_else(|| {
        ApiError::Parse("completion stream contained no message_limit event".to_string())
    })?;

    let event: MessageLimitEvent = serde_json::from_str(payload)
        .map_err(|e| ApiError::Parse(format!("malformed message_limit payload: {e}")))?;

    event
        .message_limit
        .and_then(|limit| limit.windows.get(FIVE_HOUR_WINDOW).cloned())
        .and_then(|window| window.resets_at)
        .ok_or_else(|| {
            ApiError::Parse("message_limit payload had no 5h reset timestamp".to_string())
        })
}
