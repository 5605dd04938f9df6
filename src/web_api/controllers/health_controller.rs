use axum::{extract::State, http::StatusCode};

use crate::app_state::SharedState;

pub struct HealthController {}

impl HealthController {
    pub async fn get(State(state): State<SharedState>) -> (StatusCode, String) {
        match state.tasks.ping() {
            Ok(()) => (StatusCode::OK, "ok".to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "health check failed");
                (StatusCode::SERVICE_UNAVAILABLE, format!("store unavailable: {e}"))
            }
        }
    }
}
