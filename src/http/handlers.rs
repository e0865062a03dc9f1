use super::state::AppState;
use crate::auth::Identity;
use crate::permissions;
use crate::session::{SessionConfig, VoiceSession};
use crate::store::{CompanionFilter, NewCompanion, Subject};
use crate::voice::NatsVoiceEngine;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Subject filter; empty or "all" means no filter
    pub subject: Option<String>,

    /// Free-text filter matched against topic or name
    pub topic: Option<String>,

    /// 1-based page number (default: 1)
    pub page: Option<u32>,

    /// Page size (default: 10)
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RecentSessionsParams {
    /// Maximum history rows considered (default: 10)
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub companion_id: String,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct MuteResponse {
    pub muted: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> axum::response::Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}

/// Form-boundary validation for companion creation.
fn validate_new_companion(data: &NewCompanion) -> Result<(), String> {
    if data.name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    if data.topic.trim().is_empty() {
        return Err("topic must not be empty".to_string());
    }
    if Subject::parse(&data.subject).is_none() {
        return Err(format!("unknown subject: {}", data.subject));
    }
    if !matches!(data.voice.as_str(), "male" | "female") {
        return Err(format!("unknown voice: {}", data.voice));
    }
    if !matches!(data.style.as_str(), "casual" | "formal") {
        return Err(format!("unknown style: {}", data.style));
    }
    if data.duration < 1 || data.duration > 120 {
        return Err("duration must be between 1 and 120 minutes".to_string());
    }
    Ok(())
}

// ============================================================================
// Companion Handlers
// ============================================================================

/// POST /companions
/// Create a companion owned by the caller. The subscription gate is
/// enforced here, at creation time.
pub async fn create_companion(
    State(state): State<AppState>,
    identity: Identity,
    Json(data): Json<NewCompanion>,
) -> impl IntoResponse {
    if let Err(message) = validate_new_companion(&data) {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, message);
    }

    // Fail-closed: a failed count query rejects the create.
    let allowed =
        match permissions::can_create_companion(&identity.user_id, &identity.entitlement, state.store.as_ref())
            .await
        {
            Ok(allowed) => allowed,
            Err(e) => {
                error!("Companion gate failed for user {}: {}", identity.user_id, e);
                return error_response(e.status(), "could not verify companion limit");
            }
        };

    if !allowed {
        return error_response(StatusCode::FORBIDDEN, "companion limit reached");
    }

    match state.store.create(data, &identity.user_id).await {
        Ok(companion) => (StatusCode::CREATED, Json(companion)).into_response(),
        Err(e) => {
            error!("Failed to create companion: {}", e);
            error_response(e.status(), format!("failed to create companion: {e}"))
        }
    }
}

/// GET /companions
/// Filtered library listing. A storage failure degrades to an empty list
/// (logged); write failures never degrade.
pub async fn list_companions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let subject = params
        .subject
        .filter(|s| !s.is_empty() && s != crate::query::ALL_SENTINEL);
    let topic = params.topic.filter(|t| !t.is_empty());

    let filter = CompanionFilter {
        subject,
        topic,
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(CompanionFilter::DEFAULT_LIMIT),
    };

    match state.store.list(&filter).await {
        Ok(companions) => Json(companions).into_response(),
        Err(e) => {
            error!("Failed to list companions: {}", e);
            Json(Vec::<crate::store::Companion>::new()).into_response()
        }
    }
}

/// GET /companions/:id
/// Missing row and storage failure both render as 404; the failure is
/// logged so the two stay distinguishable operationally.
pub async fn get_companion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get_by_id(&id).await {
        Ok(Some(companion)) => Json(companion).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("companion {id} not found")),
        Err(e) => {
            error!("Failed to fetch companion {}: {}", id, e);
            error_response(StatusCode::NOT_FOUND, format!("companion {id} not found"))
        }
    }
}

/// DELETE /companions/:id
/// Only the author may delete.
pub async fn delete_companion(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.delete(&id, &identity.user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete companion {}: {}", id, e);
            error_response(e.status(), format!("failed to delete companion: {e}"))
        }
    }
}

/// GET /me/companions
/// Companions the caller created, newest first.
pub async fn my_companions(
    State(state): State<AppState>,
    identity: Identity,
) -> impl IntoResponse {
    match state.store.list_by_author(&identity.user_id).await {
        Ok(companions) => Json(companions).into_response(),
        Err(e) => {
            error!(
                "Failed to list companions for user {}: {}",
                identity.user_id, e
            );
            Json(Vec::<crate::store::Companion>::new()).into_response()
        }
    }
}

/// GET /me/sessions
/// Companions from the caller's session history, most recent session
/// first, each companion once.
pub async fn my_sessions(State(state): State<AppState>, identity: Identity) -> impl IntoResponse {
    match state.store.sessions_by_user(&identity.user_id).await {
        Ok(companions) => Json(companions).into_response(),
        Err(e) => {
            error!(
                "Failed to list sessions for user {}: {}",
                identity.user_id, e
            );
            Json(Vec::<crate::store::Companion>::new()).into_response()
        }
    }
}

/// GET /sessions/recent
/// Companions from the latest sessions across all users, for the home
/// page listing. Not scoped to the caller, so no identity is required.
pub async fn recent_sessions(
    State(state): State<AppState>,
    Query(params): Query<RecentSessionsParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(10);

    match state.store.recent_sessions(limit).await {
        Ok(companions) => Json(companions).into_response(),
        Err(e) => {
            error!("Failed to list recent sessions: {}", e);
            Json(Vec::<crate::store::Companion>::new()).into_response()
        }
    }
}

// ============================================================================
// Session Handlers
// ============================================================================

/// POST /sessions
/// Start a voice session against a companion.
pub async fn start_session(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<StartSessionRequest>,
) -> impl IntoResponse {
    // The companion must exist; sessions are not gated by subscription.
    let companion = match state.store.get_by_id(&req.companion_id).await {
        Ok(Some(companion)) => companion,
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                format!("companion {} not found", req.companion_id),
            );
        }
        Err(e) => {
            error!("Failed to fetch companion {}: {}", req.companion_id, e);
            return error_response(
                StatusCode::NOT_FOUND,
                format!("companion {} not found", req.companion_id),
            );
        }
    };

    let session_id = SessionConfig::new_session_id();

    info!(
        "Starting session {} for companion {} (user {})",
        session_id, companion.id, identity.user_id
    );

    let client = match state.voice_client().await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to reach voice engine: {}", e);
            return error_response(StatusCode::BAD_GATEWAY, "voice engine unavailable");
        }
    };
    let engine = Arc::new(NatsVoiceEngine::new(client, session_id.clone()));

    let config = SessionConfig {
        session_id: session_id.clone(),
        companion_id: companion.id.clone(),
        user_id: identity.user_id.clone(),
        subject: companion.subject,
        topic: companion.topic,
        style: companion.style,
        voice: companion.voice,
    };

    let session = Arc::new(VoiceSession::new(config, engine, state.history.clone()));

    if let Err(e) = session.start().await {
        error!("Failed to start session {}: {}", session_id, e);
        return error_response(e.status(), format!("failed to start session: {e}"));
    }

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id.clone(), session.clone());
    }
    // Evict the registry entry when the engine event stream drains
    state.watch_session(session);

    (
        StatusCode::OK,
        Json(StartSessionResponse {
            session_id,
            status: "connecting".to_string(),
        }),
    )
        .into_response()
}

/// Look up a live session owned by the caller.
async fn owned_session(
    state: &AppState,
    identity: &Identity,
    session_id: &str,
) -> Result<Arc<VoiceSession>, axum::response::Response> {
    let sessions = state.sessions.read().await;

    let session = sessions.get(session_id).cloned().ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            format!("session {session_id} not found"),
        )
    })?;

    if session.user_id() != identity.user_id {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "session belongs to another user",
        ));
    }

    Ok(session)
}

/// POST /sessions/:session_id/stop
/// End the call. History is written when the engine's own end event
/// arrives, not here.
pub async fn stop_session(
    State(state): State<AppState>,
    identity: Identity,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let session = match owned_session(&state, &identity, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match session.stop().await {
        Ok(()) => {
            info!("Session {} stopped", session_id);
            Json(session.status().await).into_response()
        }
        Err(e) => {
            error!("Failed to stop session {}: {}", session_id, e);
            error_response(e.status(), format!("failed to stop session: {e}"))
        }
    }
}

/// POST /sessions/:session_id/mute
/// Toggle the microphone; only valid while the call is active.
pub async fn mute_session(
    State(state): State<AppState>,
    identity: Identity,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let session = match owned_session(&state, &identity, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match session.toggle_mute().await {
        Ok(muted) => Json(MuteResponse { muted }).into_response(),
        Err(e) => error_response(e.status(), format!("failed to toggle mute: {e}")),
    }
}

/// GET /sessions/:session_id
/// Current call status snapshot.
pub async fn session_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match owned_session(&state, &identity, &session_id).await {
        Ok(session) => Json(session.status().await).into_response(),
        Err(response) => response,
    }
}

/// GET /sessions/:session_id/transcript
/// Finalized transcript lines collected so far, most recent first.
pub async fn session_transcript(
    State(state): State<AppState>,
    identity: Identity,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match owned_session(&state, &identity, &session_id).await {
        Ok(session) => Json(session.transcript().await).into_response(),
        Err(response) => response,
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
