use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Who produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Lifecycle and transcript events emitted by the voice engine.
///
/// Delivery is treated as at-least-once; consumers must tolerate
/// duplicates of the same event.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The call is live.
    Connected,
    /// The engine ended the call (natural end, or after a close request).
    Disconnected,
    /// A speech-to-text fragment. Interim fragments have `is_final == false`.
    Transcript {
        role: Role,
        text: String,
        is_final: bool,
    },
    /// The assistant started speaking.
    SpeechStart,
    /// The assistant stopped speaking.
    SpeechEnd,
    /// Engine-side error; informational only.
    Error(String),
}

/// Parameters for one voice session.
#[derive(Debug, Clone)]
pub struct SessionSpec {
    pub session_id: String,
    pub subject: String,
    pub topic: String,
    pub style: String,
    pub voice: String,
}

/// The real-time voice engine collaborator.
///
/// Speech recognition, synthesis, and LLM inference all live behind this
/// trait; the service never sees audio. Internal retry/reconnect behavior
/// is the engine's own business.
#[async_trait::async_trait]
pub trait VoiceEngine: Send + Sync {
    /// Open the call described by `spec`.
    ///
    /// Returns a channel receiver that will receive engine events for this
    /// session, starting with `Connected` once the call is live.
    async fn start(&self, spec: &SessionSpec) -> Result<mpsc::Receiver<EngineEvent>>;

    /// Ask the engine to close the call. The engine still emits its own
    /// `Disconnected` event afterwards.
    async fn stop(&self) -> Result<()>;

    /// Current microphone mute state.
    async fn is_muted(&self) -> bool;

    /// Mute or unmute the caller's microphone.
    async fn set_muted(&self, muted: bool) -> Result<()>;
}
