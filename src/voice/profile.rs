use super::engine::SessionSpec;
use serde::{Deserialize, Serialize};

/// Fallback voice when a (voice, style) pair has no table entry.
pub const DEFAULT_VOICE_ID: &str = "sarah";

/// (voice, style) -> engine voice id.
const VOICE_TABLE: [(&str, &str, &str); 4] = [
    ("male", "casual", "aiden"),
    ("male", "formal", "graham"),
    ("female", "casual", "zoe"),
    ("female", "formal", "sarah"),
];

/// Resolve the engine voice id for a companion's voice and style slugs.
pub fn resolve_voice_id(voice: &str, style: &str) -> &'static str {
    VOICE_TABLE
        .iter()
        .find(|(v, s, _)| *v == voice && *s == style)
        .map(|(_, _, id)| *id)
        .unwrap_or(DEFAULT_VOICE_ID)
}

/// Tutor configuration sent to the voice engine when a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantProfile {
    pub name: String,
    pub voice_id: String,
    pub first_message: String,
    pub system_prompt: String,
}

impl AssistantProfile {
    /// Build the tutor profile for one session.
    pub fn for_session(spec: &SessionSpec) -> Self {
        let first_message = format!(
            "Hello, let's start the session. Today we'll be talking about {}.",
            spec.topic
        );

        let system_prompt = format!(
            "You are a highly knowledgeable tutor teaching a real-time voice session \
             with a student. Your goal is to teach the student about the topic and subject.\n\
             Stick to the given topic - {topic} and subject - {subject} and teach the student about it.\n\
             Keep the conversation flowing smoothly while maintaining control.\n\
             From time to time make sure that the student is following you and understands you.\n\
             Break down the topic into smaller parts and teach the student one part at a time.\n\
             Keep your style of conversation {style}.\n\
             Keep your responses short, like in a real voice conversation.\n\
             Do not include any special characters in your responses - this is a voice conversation.",
            topic = spec.topic,
            subject = spec.subject,
            style = spec.style,
        );

        Self {
            name: "Companion".to_string(),
            voice_id: resolve_voice_id(&spec.voice, &spec.style).to_string(),
            first_message,
            system_prompt,
        }
    }
}
