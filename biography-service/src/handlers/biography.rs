use crate::models::{BiographyRequest, BiographyResponse};
use crate::services::RelayError;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

/// `POST /generate-biography`
///
/// The body is parsed as untyped JSON and `poetName` is looked up only on an
/// object. Anything unreadable is treated like a body without `poetName`,
/// so every bad input gets the same 400 envelope.
pub async fn generate_biography(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BiographyResponse>, RelayError> {
    let request = match payload {
        Ok(Json(body)) => BiographyRequest::from_body(body),
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "Unreadable biography request body");
            BiographyRequest::default()
        }
    };

    state.relay.generate(&request).await.map(Json)
}
