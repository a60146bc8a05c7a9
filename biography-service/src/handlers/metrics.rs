use crate::startup::AppState;
use axum::extract::State;

/// `GET /metrics` in Prometheus text format.
pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
