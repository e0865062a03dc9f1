use crate::voice::SessionSpec;
use serde::{Deserialize, Serialize};

/// Configuration for one voice tutoring session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g. "session-<uuid>")
    pub session_id: String,

    /// Companion being tutored with
    pub companion_id: String,

    /// User running the session
    pub user_id: String,

    pub subject: String,
    pub topic: String,
    pub style: String,
    pub voice: String,
}

impl SessionConfig {
    pub fn new_session_id() -> String {
        format!("session-{}", uuid::Uuid::new_v4())
    }

    /// The engine-facing slice of this configuration.
    pub fn spec(&self) -> SessionSpec {
        SessionSpec {
            session_id: self.session_id.clone(),
            subject: self.subject.clone(),
            topic: self.topic.clone(),
            style: self.style.clone(),
            voice: self.voice.clone(),
        }
    }
}
