//! HTTP boundary adapters.
//!
//! Handlers validate required fields, delegate to the store, and map
//! results onto status codes. No business logic lives here.

mod ws;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::helper;
use crate::push::PushEvent;
use crate::store::{EmailMessage, Session, DEFAULT_TTL};
use crate::AppState;

/// Build the API router. The caller supplies state and outer layers.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/session", post(create_session).get(get_session))
        .route("/api/session/rotate", post(rotate_session))
        .route("/api/session/restore", post(restore_session))
        .route("/api/session/avatar", post(update_avatar))
        .route("/api/messages", get(list_messages).post(push_message))
        .route("/api/helper/insights", post(helper_insights))
        .route("/api/ws", get(ws::ws_handler))
        .method_not_allowed_fallback(method_not_allowed)
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

// ─────────────────────────────────────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateSessionRequest {
    ttl: Option<i64>,
}

#[derive(Debug, Serialize)]
struct SessionEnvelope {
    session: Session,
}

/// POST /api/session - Allocate a new inbox.
async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> (StatusCode, Json<SessionEnvelope>) {
    let session = state.store.create(req.ttl.unwrap_or(DEFAULT_TTL));
    info!(
        name: "session.created",
        session_id = %session.id,
        ttl = session.ttl,
        "Session created"
    );
    (StatusCode::CREATED, Json(SessionEnvelope { session }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SessionQuery {
    session_id: String,
}

/// GET /api/session?sessionId= - Fetch a session with its messages.
async fn get_session(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<SessionEnvelope>, ApiError> {
    if query.session_id.trim().is_empty() {
        return Err(ApiError::missing_session());
    }
    let session = state
        .store
        .get(&query.session_id)
        .ok_or_else(ApiError::session_not_found)?;
    Ok(Json(SessionEnvelope { session }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RotateRequest {
    session_id: Option<String>,
    ttl: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RotateEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    old_session: Option<Session>,
    new_session: Session,
}

/// POST /api/session/rotate - Replace the inbox, returning both snapshots.
async fn rotate_session(
    State(state): State<AppState>,
    Json(req): Json<RotateRequest>,
) -> Result<Json<RotateEnvelope>, ApiError> {
    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(ApiError::missing_session)?;

    let (old_session, new_session) = state
        .store
        .rotate(&session_id, req.ttl.unwrap_or(DEFAULT_TTL));
    info!(
        name: "session.rotated",
        old_session_id = %session_id,
        new_session_id = %new_session.id,
        had_snapshot = old_session.is_some(),
        "Session rotated"
    );
    Ok(Json(RotateEnvelope {
        old_session,
        new_session,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RestoreRequest {
    snapshot: Option<Session>,
}

/// POST /api/session/restore - Re-insert a rotation snapshot verbatim.
async fn restore_session(
    State(state): State<AppState>,
    Json(req): Json<RestoreRequest>,
) -> Result<Json<SessionEnvelope>, ApiError> {
    let snapshot = req
        .snapshot
        .filter(|snapshot| !snapshot.id.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Invalid snapshot".to_string()))?;

    let session = state.store.restore(snapshot);
    info!(name: "session.restored", session_id = %session.id, "Session restored");
    Ok(Json(SessionEnvelope { session }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AvatarRequest {
    session_id: Option<String>,
    avatar: Option<String>,
}

/// POST /api/session/avatar - Change the display avatar in place.
async fn update_avatar(
    State(state): State<AppState>,
    Json(req): Json<AvatarRequest>,
) -> Result<Json<SessionEnvelope>, ApiError> {
    let (session_id, avatar) = match (req.session_id, req.avatar) {
        (Some(id), Some(avatar)) if !id.trim().is_empty() && !avatar.trim().is_empty() => {
            (id, avatar)
        }
        _ => return Err(ApiError::Validation("Missing data".to_string())),
    };

    let session = state
        .store
        .update_avatar(&session_id, &avatar)
        .ok_or_else(ApiError::session_not_found)?;
    Ok(Json(SessionEnvelope { session }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesEnvelope {
    messages: Vec<EmailMessage>,
}

/// GET /api/messages?sessionId= - The inbox, most recent first.
async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<MessagesEnvelope>, ApiError> {
    if query.session_id.trim().is_empty() {
        return Err(ApiError::missing_session());
    }
    Ok(Json(MessagesEnvelope {
        messages: state.store.list(&query.session_id),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PushMessageRequest {
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct MessageEnvelope {
    message: EmailMessage,
}

/// POST /api/messages - Synthesize one message and notify the topic.
async fn push_message(
    State(state): State<AppState>,
    Json(req): Json<PushMessageRequest>,
) -> Result<(StatusCode, Json<MessageEnvelope>), ApiError> {
    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(ApiError::missing_session)?;

    let message = state
        .store
        .append(&session_id)
        .ok_or_else(ApiError::session_not_found)?;

    let reached = state
        .push
        .publish(&session_id, PushEvent::Message(message.clone()));
    info!(
        name: "message.pushed",
        session_id = %session_id,
        message_id = %message.id,
        subscribers = reached,
        "Message pushed"
    );
    Ok((StatusCode::CREATED, Json(MessageEnvelope { message })))
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HelperRequest {
    session_id: Option<String>,
    message_id: Option<String>,
    prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HelperInsights {
    summary: Vec<String>,
    phishing: helper::PhishingReport,
    username_ideas: Vec<String>,
    replies: Vec<String>,
    voice_available: bool,
}

/// POST /api/helper/insights - Rule-based report for one message.
///
/// When no message id is given the most recent message is used; an empty
/// inbox yields an empty summary and a low-risk report.
async fn helper_insights(
    State(state): State<AppState>,
    Json(req): Json<HelperRequest>,
) -> Result<Json<HelperInsights>, ApiError> {
    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(ApiError::missing_session)?;
    let session = state
        .store
        .get(&session_id)
        .ok_or_else(ApiError::session_not_found)?;

    let message = match &req.message_id {
        Some(id) => session.messages.iter().find(|message| &message.id == id),
        None => session.messages.first(),
    };

    Ok(Json(HelperInsights {
        summary: message.map(helper::summarize).unwrap_or_default(),
        phishing: message
            .map(helper::phishing_risk)
            .unwrap_or_else(helper::PhishingReport::baseline),
        username_ideas: helper::username_suggestions(&session.email),
        replies: helper::evaluate_prompt(req.prompt.as_deref().unwrap_or_default(), message.is_some()),
        voice_available: state.speech.supports_speech_input(),
    }))
}
