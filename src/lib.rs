pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod permissions;
pub mod query;
pub mod session;
pub mod store;
pub mod voice;

pub use auth::{Entitlement, Identity};
pub use config::Config;
pub use errors::{SessionError, StoreError};
pub use http::{create_router, AppState};
pub use session::{CallStatus, SessionConfig, SessionStatus, TranscriptMessage, VoiceSession};
pub use store::{
    Companion, CompanionFilter, CompanionStore, NewCompanion, SessionHistoryRecord, SessionSink,
    SqliteStore, Subject,
};
pub use voice::{EngineEvent, NatsVoiceEngine, Role, SessionSpec, VoiceEngine};
