//! Voice engine collaborator
//!
//! The service never touches audio: speech recognition, synthesis, and
//! LLM inference are all delegated to an external voice engine reached
//! over NATS. This module provides:
//! - `VoiceEngine`: the narrow trait the orchestrator drives
//! - `NatsVoiceEngine`: the NATS bridge implementation
//! - the wire messages and the assistant (tutor) profile sent on start

mod engine;
mod messages;
mod nats;
mod profile;

pub use engine::{EngineEvent, Role, SessionSpec, VoiceEngine};
pub use messages::{EngineEventMessage, SessionControlMessage, SessionStartMessage};
pub use nats::NatsVoiceEngine;
pub use profile::{resolve_voice_id, AssistantProfile, DEFAULT_VOICE_ID};
