//! HTTP API server for the web client
//!
//! This module provides the REST API over companions and voice sessions:
//! - POST   /companions                      - create (subscription-gated)
//! - GET    /companions                      - filtered library listing
//! - GET    /companions/:id                  - fetch one companion
//! - DELETE /companions/:id                  - delete (owner only)
//! - GET    /me/companions                   - caller's companions
//! - GET    /me/sessions                     - caller's session history
//! - POST   /sessions                        - start a voice session
//! - POST   /sessions/:id/stop               - end a session
//! - POST   /sessions/:id/mute               - toggle microphone
//! - GET    /sessions/:id                    - session status
//! - GET    /sessions/:id/transcript         - accumulated transcript
//! - GET    /health                          - health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
