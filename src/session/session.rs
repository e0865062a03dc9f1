use super::config::SessionConfig;
use super::transcript::{CallStatus, SessionStatus, TranscriptMessage};
use crate::errors::SessionError;
use crate::store::SessionSink;
use crate::voice::{EngineEvent, VoiceEngine};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// A voice tutoring session that drives the call lifecycle, collects the
/// transcript, and records the session to history when the engine ends it.
///
/// All state transitions happen on the single event task; user actions
/// (`start`, `stop`, `toggle_mute`) only gate on the current status and
/// hand work to the engine. Engine event delivery is treated as
/// at-least-once, so every handler is idempotent under duplicates.
pub struct VoiceSession {
    /// Session configuration
    config: SessionConfig,

    /// Voice engine driving the actual call
    engine: Arc<dyn VoiceEngine>,

    /// History sink written to exactly once, when the engine ends the call
    history: Arc<dyn SessionSink>,

    /// When the session object was created
    started_at: chrono::DateTime<chrono::Utc>,

    /// Current call status
    status: Arc<RwLock<CallStatus>>,

    /// Whether the assistant is speaking (animation flag only)
    is_speaking: Arc<AtomicBool>,

    /// Bumped on every start(). An event task from an older cycle sees a
    /// newer generation and stops touching shared state, so a late end
    /// event from a previous call cannot finish or un-record the current
    /// one.
    generation: Arc<AtomicU64>,

    /// Finalized transcript lines, most recent first
    transcript: Arc<Mutex<Vec<TranscriptMessage>>>,

    /// Handle for the engine event task
    event_task_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl VoiceSession {
    pub fn new(
        config: SessionConfig,
        engine: Arc<dyn VoiceEngine>,
        history: Arc<dyn SessionSink>,
    ) -> Self {
        Self {
            config,
            engine,
            history,
            started_at: Utc::now(),
            status: Arc::new(RwLock::new(CallStatus::Inactive)),
            is_speaking: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            transcript: Arc::new(Mutex::new(Vec::new())),
            event_task_handle: Arc::new(Mutex::new(None)),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }

    /// Start the call. Valid only from Inactive or Finished.
    ///
    /// Transitions to Connecting and opens the engine connection; the
    /// engine's `Connected` event moves the session to Active. There is no
    /// connect timeout: if the engine never answers, the session stays in
    /// Connecting until `stop()`.
    pub async fn start(&self) -> Result<(), SessionError> {
        {
            let mut status = self.status.write().await;
            match *status {
                CallStatus::Inactive | CallStatus::Finished => {}
                _ => return Err(SessionError::InvalidTransition("session already running")),
            }
            *status = CallStatus::Connecting;
        }

        // Invalidate any event task still draining a previous cycle
        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        info!("Starting session {}", self.config.session_id);

        let mut events = match self.engine.start(&self.config.spec()).await {
            Ok(rx) => rx,
            Err(e) => {
                // Roll back so the user can retry
                *self.status.write().await = CallStatus::Inactive;
                return Err(SessionError::Engine(e));
            }
        };

        let status = Arc::clone(&self.status);
        let is_speaking = Arc::clone(&self.is_speaking);
        let generation = Arc::clone(&self.generation);
        let transcript = Arc::clone(&self.transcript);
        let history = Arc::clone(&self.history);
        let companion_id = self.config.companion_id.clone();
        let user_id = self.config.user_id.clone();
        let session_id = self.config.session_id.clone();

        let event_task = tokio::spawn(async move {
            info!("Event task started for session {}", session_id);

            // Each call cycle appends to history at most once; duplicate
            // end events from the engine are absorbed here.
            let mut history_recorded = false;

            while let Some(event) = events.recv().await {
                // Once a newer cycle has started this task is stale: it may
                // still settle its own history on its end event, but must
                // not touch the status, speaking flag, or transcript the
                // new cycle owns.
                let stale = generation.load(Ordering::SeqCst) != my_generation;

                match event {
                    EngineEvent::Connected => {
                        if !stale {
                            let mut status = status.write().await;
                            // Ignore duplicate or late Connected events
                            if *status == CallStatus::Connecting {
                                *status = CallStatus::Active;
                                info!("Session {} is active", session_id);
                            }
                        }
                    }

                    EngineEvent::Disconnected => {
                        if !stale {
                            *status.write().await = CallStatus::Finished;
                        }

                        // Exactly one history append per call cycle, no
                        // matter how many end events the engine delivers.
                        // Failure is logged, not surfaced.
                        if !history_recorded {
                            history_recorded = true;
                            if let Err(e) = history.record_session(&companion_id, &user_id).await
                            {
                                error!(
                                    "Failed to record session {} to history: {}",
                                    session_id, e
                                );
                            }
                        }

                        if stale {
                            break;
                        }
                    }

                    EngineEvent::Transcript {
                        role,
                        text,
                        is_final,
                    } => {
                        // Interim fragments are ignored
                        if !stale && is_final {
                            let mut lines = transcript.lock().await;
                            lines.insert(0, TranscriptMessage {
                                role,
                                content: text,
                            });
                        }
                    }

                    EngineEvent::SpeechStart => {
                        if !stale {
                            is_speaking.store(true, Ordering::SeqCst);
                        }
                    }
                    EngineEvent::SpeechEnd => {
                        if !stale {
                            is_speaking.store(false, Ordering::SeqCst);
                        }
                    }

                    EngineEvent::Error(message) => {
                        warn!("Engine error in session {}: {}", session_id, message);
                    }
                }
            }

            info!("Event task stopped for session {}", session_id);
        });

        {
            let mut handle = self.event_task_handle.lock().await;
            *handle = Some(event_task);
        }

        Ok(())
    }

    /// End the call. Valid from any state except Inactive.
    ///
    /// Transitions to Finished and asks the engine to close. History is
    /// not written here: the engine emits its own `Disconnected` after the
    /// close request, and that event performs the single append.
    pub async fn stop(&self) -> Result<(), SessionError> {
        {
            let mut status = self.status.write().await;
            if *status == CallStatus::Inactive {
                return Err(SessionError::InvalidTransition("session not started"));
            }
            *status = CallStatus::Finished;
        }

        info!("Stopping session {}", self.config.session_id);

        self.engine.stop().await.map_err(SessionError::Engine)?;

        Ok(())
    }

    /// Flip the microphone mute state. Only enabled while Active.
    /// Has no effect on the call status.
    pub async fn toggle_mute(&self) -> Result<bool, SessionError> {
        if *self.status.read().await != CallStatus::Active {
            return Err(SessionError::InvalidTransition("call is not active"));
        }

        let muted = !self.engine.is_muted().await;
        self.engine.set_muted(muted).await.map_err(SessionError::Engine)?;

        Ok(muted)
    }

    /// Current state snapshot.
    pub async fn status(&self) -> SessionStatus {
        let transcript_len = self.transcript.lock().await.len();

        SessionStatus {
            session_id: self.config.session_id.clone(),
            companion_id: self.config.companion_id.clone(),
            status: *self.status.read().await,
            is_speaking: self.is_speaking.load(Ordering::SeqCst),
            is_muted: self.engine.is_muted().await,
            started_at: self.started_at,
            transcript_len,
        }
    }

    /// Transcript collected so far, most recent line first.
    pub async fn transcript(&self) -> Vec<TranscriptMessage> {
        self.transcript.lock().await.clone()
    }

    /// Wait until the engine event stream has drained.
    ///
    /// Returns once the event task exits, i.e. after the engine closed the
    /// stream. Useful for shutdown paths and tests that need the final
    /// history write to have happened.
    pub async fn wait_for_end(&self) {
        let handle = {
            let mut guard = self.event_task_handle.lock().await;
            guard.take()
        };

        if let Some(task) = handle {
            if let Err(e) = task.await {
                error!("Event task panicked: {}", e);
            }
        }
    }
}
