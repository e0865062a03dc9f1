use super::engine::{EngineEvent, SessionSpec, VoiceEngine};
use super::messages::{EngineEventMessage, SessionControlMessage, SessionStartMessage};
use super::profile::AssistantProfile;
use anyhow::{Context, Result};
use async_nats::Client;
use futures::stream::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// NATS-backed voice engine bridge.
///
/// The engine itself (STT, TTS, LLM) runs elsewhere; this client publishes
/// session commands and forwards the engine's event stream for one session.
pub struct NatsVoiceEngine {
    client: Client,
    session_id: String,
    muted: AtomicBool,
}

impl NatsVoiceEngine {
    /// Bridge one session over an existing NATS connection. The client is
    /// shared across sessions; each bridge keeps only its own subject
    /// space and mute flag.
    pub fn new(client: Client, session_id: String) -> Self {
        Self {
            client,
            session_id,
            muted: AtomicBool::new(false),
        }
    }

    fn control_subject(&self) -> String {
        format!("voice.session.control.{}", self.session_id)
    }

    async fn publish_control(&self, command: &str) -> Result<()> {
        let message = SessionControlMessage {
            session_id: self.session_id.clone(),
            command: command.to_string(),
        };
        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(self.control_subject(), payload.into())
            .await
            .with_context(|| format!("Failed to publish {command} command"))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl VoiceEngine for NatsVoiceEngine {
    async fn start(&self, spec: &SessionSpec) -> Result<mpsc::Receiver<EngineEvent>> {
        // Subscribe before publishing the start command so no event can
        // slip past between the two.
        let subject = format!("voice.session.events.{}", self.session_id);
        let mut subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .context("Failed to subscribe to engine events")?;

        info!("Subscribed to engine events on {}", subject);

        let message = SessionStartMessage {
            session_id: self.session_id.clone(),
            assistant: AssistantProfile::for_session(spec),
            client_messages: vec!["transcript".to_string()],
            server_messages: vec![],
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish("voice.session.start", payload.into())
            .await
            .context("Failed to publish session start")?;

        info!("Published session start for {}", self.session_id);

        let (tx, rx) = mpsc::channel(64);
        let session_id = self.session_id.clone();

        tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                let event = match serde_json::from_slice::<EngineEventMessage>(&msg.payload) {
                    Ok(wire) => {
                        // Filter by session_id in the payload
                        if wire.session_id != session_id {
                            continue;
                        }
                        wire.into_event()
                    }
                    Err(e) => {
                        warn!("Failed to parse engine event: {}", e);
                        continue;
                    }
                };

                let Some(event) = event else {
                    warn!("Dropping unrecognized engine event");
                    continue;
                };

                let last = matches!(event, EngineEvent::Disconnected);

                if tx.send(event).await.is_err() {
                    // Consumer went away (session dropped)
                    break;
                }
                if last {
                    break;
                }
            }

            info!("Engine event stream for {} closed", session_id);
        });

        Ok(rx)
    }

    async fn stop(&self) -> Result<()> {
        self.publish_control(SessionControlMessage::STOP).await
    }

    async fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    async fn set_muted(&self, muted: bool) -> Result<()> {
        let command = if muted {
            SessionControlMessage::MUTE
        } else {
            SessionControlMessage::UNMUTE
        };
        self.publish_control(command).await?;
        self.muted.store(muted, Ordering::SeqCst);

        Ok(())
    }
}
