use super::engine::{EngineEvent, Role};
use super::profile::AssistantProfile;
use serde::{Deserialize, Serialize};

/// Session-start command published to the voice engine.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStartMessage {
    pub session_id: String,
    pub assistant: AssistantProfile,
    /// Event kinds the engine should deliver to us ("transcript" only;
    /// lifecycle events are always delivered).
    pub client_messages: Vec<String>,
    /// Messages we push to the engine mid-call (none).
    pub server_messages: Vec<String>,
    pub timestamp: String, // RFC3339
}

/// In-call control command (stop / mute / unmute).
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionControlMessage {
    pub session_id: String,
    pub command: String,
}

impl SessionControlMessage {
    pub const STOP: &'static str = "stop";
    pub const MUTE: &'static str = "mute";
    pub const UNMUTE: &'static str = "unmute";
}

/// Event message received from the voice engine.
#[derive(Debug, Serialize, Deserialize)]
pub struct EngineEventMessage {
    pub session_id: String,
    /// "connected" | "disconnected" | "transcript" | "speech-start"
    /// | "speech-end" | "error"
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// For transcript events: true while the fragment is still interim.
    #[serde(default)]
    pub partial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: String, // RFC3339
}

impl EngineEventMessage {
    /// Map the wire message onto an [`EngineEvent`].
    ///
    /// Returns `None` for unknown event kinds or malformed transcript
    /// payloads; those are logged and dropped by the bridge.
    pub fn into_event(self) -> Option<EngineEvent> {
        match self.event.as_str() {
            "connected" => Some(EngineEvent::Connected),
            "disconnected" => Some(EngineEvent::Disconnected),
            "speech-start" => Some(EngineEvent::SpeechStart),
            "speech-end" => Some(EngineEvent::SpeechEnd),
            "error" => Some(EngineEvent::Error(
                self.message.unwrap_or_else(|| "unknown engine error".to_string()),
            )),
            "transcript" => Some(EngineEvent::Transcript {
                role: self.role?,
                text: self.text?,
                is_final: !self.partial,
            }),
            _ => None,
        }
    }
}
