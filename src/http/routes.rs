use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Companion library
        .route(
            "/companions",
            post(handlers::create_companion).get(handlers::list_companions),
        )
        .route(
            "/companions/:id",
            get(handlers::get_companion).delete(handlers::delete_companion),
        )
        // Caller's profile data
        .route("/me/companions", get(handlers::my_companions))
        .route("/me/sessions", get(handlers::my_sessions))
        // Voice sessions
        .route("/sessions", post(handlers::start_session))
        .route("/sessions/recent", get(handlers::recent_sessions))
        .route("/sessions/:session_id", get(handlers::session_status))
        .route("/sessions/:session_id/stop", post(handlers::stop_session))
        .route("/sessions/:session_id/mute", post(handlers::mute_session))
        .route(
            "/sessions/:session_id/transcript",
            get(handlers::session_transcript),
        )
        // Request logging + CORS for the web client
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
