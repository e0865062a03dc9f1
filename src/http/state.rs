use crate::session::VoiceSession;
use crate::store::{CompanionStore, SessionSink, SqliteStore};
use async_nats::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::{info, warn};

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Companion and history storage
    pub store: Arc<dyn CompanionStore>,

    /// Narrow history-append handle given to each session
    pub history: Arc<dyn SessionSink>,

    /// NATS server the voice engine listens on
    pub nats_url: String,

    /// One NATS connection shared by every session bridge, established on
    /// the first session start
    voice_client: Arc<OnceCell<Client>>,

    /// Live voice sessions (session_id → session)
    pub sessions: Arc<RwLock<HashMap<String, Arc<VoiceSession>>>>,
}

impl AppState {
    pub fn new(store: SqliteStore, nats_url: String) -> Self {
        Self {
            store: Arc::new(store.clone()),
            history: Arc::new(store),
            nats_url,
            voice_client: Arc::new(OnceCell::new()),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The shared voice-engine NATS connection, connecting lazily on first
    /// use. A failed connect is not cached; the next session retries.
    pub async fn voice_client(&self) -> Result<Client, async_nats::ConnectError> {
        self.voice_client
            .get_or_try_init(|| {
                info!("Connecting to voice engine NATS at {}", self.nats_url);
                async_nats::connect(self.nats_url.clone())
            })
            .await
            .cloned()
    }

    /// Drop the session's registry entry once its event stream drains, so
    /// finished sessions do not accumulate in a long-running process.
    pub fn watch_session(&self, session: Arc<VoiceSession>) {
        let sessions = Arc::clone(&self.sessions);

        tokio::spawn(async move {
            session.wait_for_end().await;

            let mut sessions = sessions.write().await;
            if sessions.remove(session.session_id()).is_some() {
                info!("Session {} finished, registry entry removed", session.session_id());
            } else {
                warn!(
                    "Session {} already missing from the registry",
                    session.session_id()
                );
            }
        });
    }
}
