use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

use hooklog_stream::TopicStats;

use crate::AppState;
use crate::error::ApiError;

// ═══════════════════════════════════════════════════════════════
//  REST: GET /api/topics
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_list_topics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.stream.topic_names())
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /api/topics/{name}
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_topic_stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TopicStats>, ApiError> {
    state
        .stream
        .topic(&name)
        .map(|topic| Json(topic.stats()))
        .ok_or(ApiError::TopicNotFound(name))
}
