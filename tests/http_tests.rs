// Tests for the HTTP boundary
//
// Covers identity extraction from the gateway headers, payload validation
// on companion creation, the creation gate's status codes, and eviction of
// finished sessions from the live-session registry.

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::{mpsc, Mutex};
use tower::ServiceExt;
use tutorium::auth::Identity;
use tutorium::session::{SessionConfig, VoiceSession};
use tutorium::store::SqliteStore;
use tutorium::voice::{EngineEvent, SessionSpec, VoiceEngine};
use tutorium::{create_router, AppState};

async fn test_state(dir: &TempDir) -> Result<AppState> {
    let db_path = dir.path().join("http-test.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    let store = SqliteStore::connect(&url).await?;

    Ok(AppState::new(store, "nats://localhost:4222".to_string()))
}

fn valid_payload() -> serde_json::Value {
    serde_json::json!({
        "name": "Neura",
        "subject": "science",
        "topic": "neural networks",
        "voice": "female",
        "style": "casual",
        "duration": 20
    })
}

fn create_request(
    user: Option<&str>,
    plan: Option<&str>,
    payload: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/companions")
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    if let Some(plan) = plan {
        builder = builder.header("x-user-plan", plan);
    }

    builder.body(Body::from(payload.to_string())).unwrap()
}

// ============================================================================
// Identity extraction
// ============================================================================

#[tokio::test]
async fn test_identity_parses_plan_and_features() {
    let request = Request::builder()
        .uri("/")
        .header("x-user-id", "user-1")
        .header("x-user-plan", "pro")
        .header("x-user-features", "3_companion_limit, 10_companion_limit,")
        .body(())
        .unwrap();
    let (mut parts, _) = request.into_parts();

    let identity = Identity::from_request_parts(&mut parts, &()).await.unwrap();

    assert_eq!(identity.user_id, "user-1");
    assert!(identity.entitlement.has_plan("pro"));
    assert!(identity.entitlement.has_feature("3_companion_limit"));
    assert!(identity.entitlement.has_feature("10_companion_limit"));
    // Trailing separator yields no empty feature
    assert_eq!(identity.entitlement.features.len(), 2);
}

#[tokio::test]
async fn test_identity_defaults_without_entitlement_headers() {
    let request = Request::builder()
        .uri("/")
        .header("x-user-id", "user-1")
        .body(())
        .unwrap();
    let (mut parts, _) = request.into_parts();

    let identity = Identity::from_request_parts(&mut parts, &()).await.unwrap();

    assert_eq!(identity.entitlement.plan, "");
    assert!(identity.entitlement.features.is_empty());
}

#[tokio::test]
async fn test_identity_rejects_missing_user_id() {
    let request = Request::builder().uri("/").body(()).unwrap();
    let (mut parts, _) = request.into_parts();

    let rejection = Identity::from_request_parts(&mut parts, &())
        .await
        .unwrap_err();
    assert_eq!(rejection.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_identity_rejects_blank_user_id() {
    let request = Request::builder()
        .uri("/")
        .header("x-user-id", "   ")
        .body(())
        .unwrap();
    let (mut parts, _) = request.into_parts();

    let rejection = Identity::from_request_parts(&mut parts, &())
        .await
        .unwrap_err();
    assert_eq!(rejection.0, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Companion creation: validation and the gate
// ============================================================================

#[tokio::test]
async fn test_create_without_identity_is_unauthorized() -> Result<()> {
    let dir = TempDir::new()?;
    let app = create_router(test_state(&dir).await?);

    let response = app
        .oneshot(create_request(None, Some("pro"), valid_payload()))
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_create_rejects_invalid_payloads() -> Result<()> {
    let dir = TempDir::new()?;
    let app = create_router(test_state(&dir).await?);

    let mut blank_name = valid_payload();
    blank_name["name"] = "  ".into();
    let mut bad_subject = valid_payload();
    bad_subject["subject"] = "alchemy".into();
    let mut bad_voice = valid_payload();
    bad_voice["voice"] = "robotic".into();
    let mut bad_style = valid_payload();
    bad_style["style"] = "sarcastic".into();
    let mut zero_duration = valid_payload();
    zero_duration["duration"] = 0.into();

    for payload in [blank_name, bad_subject, bad_voice, bad_style, zero_duration] {
        let response = app
            .clone()
            .oneshot(create_request(Some("user-1"), Some("pro"), payload.clone()))
            .await?;
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "payload should be rejected: {payload}"
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_create_without_entitlement_is_forbidden() -> Result<()> {
    let dir = TempDir::new()?;
    let app = create_router(test_state(&dir).await?);

    let response = app
        .oneshot(create_request(Some("user-1"), None, valid_payload()))
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_create_with_unlimited_plan_succeeds() -> Result<()> {
    let dir = TempDir::new()?;
    let app = create_router(test_state(&dir).await?);

    let response = app
        .oneshot(create_request(Some("user-1"), Some("pro"), valid_payload()))
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);

    Ok(())
}

// ============================================================================
// Session registry eviction
// ============================================================================

/// Engine stub with one scripted event stream.
struct ScriptedEngine {
    events: Mutex<Option<mpsc::Receiver<EngineEvent>>>,
}

#[async_trait]
impl VoiceEngine for ScriptedEngine {
    async fn start(&self, _spec: &SessionSpec) -> Result<mpsc::Receiver<EngineEvent>> {
        self.events
            .lock()
            .await
            .take()
            .ok_or_else(|| anyhow::anyhow!("no scripted event stream left"))
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }

    async fn is_muted(&self) -> bool {
        false
    }

    async fn set_muted(&self, _muted: bool) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_finished_session_is_evicted_from_registry() -> Result<()> {
    let dir = TempDir::new()?;
    let state = test_state(&dir).await?;

    let (tx, rx) = mpsc::channel(4);
    let engine = Arc::new(ScriptedEngine {
        events: Mutex::new(Some(rx)),
    });
    let config = SessionConfig {
        session_id: "session-evict".to_string(),
        companion_id: "companion-1".to_string(),
        user_id: "user-1".to_string(),
        subject: "maths".to_string(),
        topic: "fractions".to_string(),
        style: "casual".to_string(),
        voice: "female".to_string(),
    };

    let session = Arc::new(VoiceSession::new(config, engine, state.history.clone()));
    session.start().await?;

    state
        .sessions
        .write()
        .await
        .insert("session-evict".to_string(), session.clone());
    state.watch_session(session);

    tx.send(EngineEvent::Connected).await?;
    tx.send(EngineEvent::Disconnected).await?;
    drop(tx);

    for _ in 0..100 {
        if state.sessions.read().await.is_empty() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("finished session was never removed from the registry");
}
