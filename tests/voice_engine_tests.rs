// Unit tests for the voice engine wire messages and assistant profile
//
// These verify JSON round-trips for the NATS messages and the mapping
// from wire events onto EngineEvent.

use tutorium::session::SessionConfig;
use tutorium::voice::{
    resolve_voice_id, AssistantProfile, EngineEvent, EngineEventMessage, Role,
    SessionControlMessage, SessionStartMessage, DEFAULT_VOICE_ID,
};

fn spec() -> tutorium::voice::SessionSpec {
    SessionConfig {
        session_id: "session-test".to_string(),
        companion_id: "companion-1".to_string(),
        user_id: "user-1".to_string(),
        subject: "history".to_string(),
        topic: "the Roman Republic".to_string(),
        style: "formal".to_string(),
        voice: "male".to_string(),
    }
    .spec()
}

#[test]
fn test_connected_event_mapping() {
    let json = r#"{
        "session_id": "session-test",
        "event": "connected",
        "timestamp": "2026-08-29T10:00:00Z"
    }"#;

    let wire: EngineEventMessage = serde_json::from_str(json).unwrap();
    assert!(matches!(wire.into_event(), Some(EngineEvent::Connected)));
}

#[test]
fn test_final_transcript_mapping() {
    let json = r#"{
        "session_id": "session-test",
        "event": "transcript",
        "role": "assistant",
        "text": "Let us begin with the consuls.",
        "partial": false,
        "timestamp": "2026-08-29T10:00:05Z"
    }"#;

    let wire: EngineEventMessage = serde_json::from_str(json).unwrap();
    match wire.into_event() {
        Some(EngineEvent::Transcript {
            role,
            text,
            is_final,
        }) => {
            assert_eq!(role, Role::Assistant);
            assert_eq!(text, "Let us begin with the consuls.");
            assert!(is_final);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn test_interim_transcript_is_not_final() {
    let json = r#"{
        "session_id": "session-test",
        "event": "transcript",
        "role": "user",
        "text": "what abou",
        "partial": true,
        "timestamp": "2026-08-29T10:00:06Z"
    }"#;

    let wire: EngineEventMessage = serde_json::from_str(json).unwrap();
    match wire.into_event() {
        Some(EngineEvent::Transcript { is_final, .. }) => assert!(!is_final),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn test_transcript_without_role_is_dropped() {
    let json = r#"{
        "session_id": "session-test",
        "event": "transcript",
        "text": "orphan line",
        "partial": false,
        "timestamp": "2026-08-29T10:00:07Z"
    }"#;

    let wire: EngineEventMessage = serde_json::from_str(json).unwrap();
    assert!(wire.into_event().is_none());
}

#[test]
fn test_unknown_event_kind_is_dropped() {
    let json = r#"{
        "session_id": "session-test",
        "event": "telemetry",
        "timestamp": "2026-08-29T10:00:08Z"
    }"#;

    let wire: EngineEventMessage = serde_json::from_str(json).unwrap();
    assert!(wire.into_event().is_none());
}

#[test]
fn test_error_event_carries_message() {
    let json = r#"{
        "session_id": "session-test",
        "event": "error",
        "message": "transcriber unavailable",
        "timestamp": "2026-08-29T10:00:09Z"
    }"#;

    let wire: EngineEventMessage = serde_json::from_str(json).unwrap();
    match wire.into_event() {
        Some(EngineEvent::Error(message)) => assert_eq!(message, "transcriber unavailable"),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn test_session_start_message_serialization() {
    let message = SessionStartMessage {
        session_id: "session-test".to_string(),
        assistant: AssistantProfile::for_session(&spec()),
        client_messages: vec!["transcript".to_string()],
        server_messages: vec![],
        timestamp: "2026-08-29T10:00:00Z".to_string(),
    };

    let json = serde_json::to_string(&message).unwrap();
    assert!(json.contains("session-test"));
    assert!(json.contains("transcript"));
    assert!(json.contains("\"server_messages\":[]"));

    let deserialized: SessionStartMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.session_id, "session-test");
    assert_eq!(deserialized.client_messages, vec!["transcript"]);
}

#[test]
fn test_control_message_commands() {
    let message = SessionControlMessage {
        session_id: "session-test".to_string(),
        command: SessionControlMessage::STOP.to_string(),
    };

    let json = serde_json::to_string(&message).unwrap();
    assert!(json.contains("\"command\":\"stop\""));
}

#[test]
fn test_voice_id_resolution() {
    assert_eq!(resolve_voice_id("female", "formal"), "sarah");
    assert_ne!(
        resolve_voice_id("male", "casual"),
        resolve_voice_id("male", "formal")
    );
}

#[test]
fn test_voice_id_falls_back_for_unknown_pair() {
    assert_eq!(resolve_voice_id("robotic", "sarcastic"), DEFAULT_VOICE_ID);
}

#[test]
fn test_assistant_profile_embeds_session_details() {
    let profile = AssistantProfile::for_session(&spec());

    assert!(profile.first_message.contains("the Roman Republic"));
    assert!(profile.system_prompt.contains("the Roman Republic"));
    assert!(profile.system_prompt.contains("history"));
    assert!(profile.system_prompt.contains("formal"));
    assert_eq!(profile.voice_id, resolve_voice_id("male", "formal"));
}
