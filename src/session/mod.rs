//! Voice session orchestration
//!
//! This module provides the `VoiceSession` abstraction that manages:
//! - The call lifecycle (Inactive -> Connecting -> Active -> Finished)
//! - Consuming the voice engine's event stream on a single task
//! - Transcript collection (finalized fragments only, most recent first)
//! - The one-and-only-one session-history append on natural end

mod config;
mod session;
mod transcript;

pub use config::SessionConfig;
pub use session::VoiceSession;
pub use transcript::{CallStatus, SessionStatus, TranscriptMessage};
