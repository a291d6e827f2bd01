use axum::extract::State;
use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::AppState;
use crate::error::{ApiError, EventError};
use crate::signature::{self, SIGNATURE_256_HEADER, SIGNATURE_HEADER};

pub const EVENT_HEADER: &str = "X-GitHub-Event";
pub const EVENT_ISSUES: &str = "issues";

const ACTION_OPENED: &str = "opened";

#[derive(Deserialize)]
struct IssuesEvent {
    action: String,
    issue: Box<RawValue>,
}

// ═══════════════════════════════════════════════════════════════
//  Webhook: POST /github
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_github(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    if method != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }

    let event = header(&headers, EVENT_HEADER).unwrap_or_default();
    if event != EVENT_ISSUES {
        return Err(ApiError::UnsupportedEvent(event.to_string()));
    }

    let event = read_event(&state, &headers, &body).map_err(ApiError::BadEvent)?;
    match event.action.as_str() {
        ACTION_OPENED => {
            let payload = Bytes::copy_from_slice(event.issue.get().as_bytes());
            let offset = state.stream.publish(&state.webhook.issues_topic, payload);
            tracing::debug!(topic = %state.webhook.issues_topic, offset, "accepted issue event");
            Ok("OK")
        }
        _ => Err(ApiError::UnsupportedAction(event.action)),
    }
}

fn read_event(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<IssuesEvent, EventError> {
    // an empty secret turns verification off
    if !state.webhook.secret.is_empty() {
        signature::verify(
            state.webhook.secret.as_bytes(),
            header(headers, SIGNATURE_256_HEADER),
            header(headers, SIGNATURE_HEADER),
            body,
        )?;
    }
    Ok(serde_json::from_slice(body)?)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
