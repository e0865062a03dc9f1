use crate::voice::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Call lifecycle of one session.
///
/// Transitions only ever move forward: Inactive -> Connecting -> Active
/// -> Finished. A finished session can be started again, which begins a
/// new cycle at Connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Inactive,
    Connecting,
    Active,
    Finished,
}

/// One finalized transcript line, held in memory for the session only.
/// Never persisted; discarded when the session is dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub content: String,
}

/// Snapshot of a session's state, served over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub companion_id: String,
    pub status: CallStatus,
    /// Whether the assistant is currently speaking (animation hint only)
    pub is_speaking: bool,
    pub is_muted: bool,
    pub started_at: DateTime<Utc>,
    pub transcript_len: usize,
}
