use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, participant, recurrence, session};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Sessions
        .route("/api/v1/sessions", post(session::create_session).get(session::get_my_sessions))
        .route("/api/v1/sessions/discover", get(session::discover_sessions))
        .route("/api/v1/sessions/{id}", get(session::get_session).put(session::update_session).delete(session::delete_session))
        .route("/api/v1/sessions/{id}/clone", post(session::clone_session))

        // Recurrence
        .route("/api/v1/sessions/{id}/occurrences", get(recurrence::preview_occurrences))
        .route("/api/v1/sessions/{id}/instances", post(recurrence::generate_instances))

        // Participants
        .route("/api/v1/sessions/{id}/join", post(participant::join_session))
        .route("/api/v1/sessions/{id}/leave", post(participant::leave_session))
        .route("/api/v1/sessions/{id}/confirm", post(participant::confirm_registration))
        .route("/api/v1/sessions/{id}/check-in", post(participant::self_check_in))
        .route("/api/v1/sessions/{id}/participants", get(participant::list_participants))
        .route("/api/v1/sessions/{id}/participants/{user_id}", put(participant::update_participant_status))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
