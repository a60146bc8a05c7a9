//! Cross-origin allow-list.
//!
//! Browsers only honour CORS headers, they do not stop a request from being
//! executed. `origin_guard_middleware` therefore refuses any request whose
//! `Origin` header is outside the allow-list before it reaches a handler,
//! while `OriginAllowList::cors_layer` answers preflights and decorates
//! responses for the origins that are allowed. Requests without an `Origin`
//! header (curl, server-to-server) are let through.

use crate::error::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, Method, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

#[derive(Debug, Clone)]
pub struct OriginAllowList {
    origins: Arc<[HeaderValue]>,
}

impl OriginAllowList {
    /// Build the list, skipping entries that are not valid header values.
    ///
    /// The wildcard `*` is rejected as well: an allow-list must name origins.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins: Vec<HeaderValue> = origins
            .into_iter()
            .filter_map(|origin| {
                let origin = origin.as_ref().trim();
                if origin.is_empty() {
                    return None;
                }
                if origin == "*" {
                    tracing::error!("Wildcard CORS origin is not supported. Skipping.");
                    return None;
                }
                match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::error!("Invalid CORS origin '{}': {}. Skipping.", origin, e);
                        None
                    }
                }
            })
            .collect();

        Self {
            origins: origins.into(),
        }
    }

    pub fn is_allowed(&self, origin: &HeaderValue) -> bool {
        self.origins.iter().any(|allowed| allowed == origin)
    }

    pub fn origins(&self) -> &[HeaderValue] {
        &self.origins
    }

    pub fn cors_layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.origins.iter().cloned()))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                HeaderName::from_static("x-request-id"),
            ])
    }
}

pub async fn origin_guard_middleware(
    State(allow_list): State<OriginAllowList>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        if !allow_list.is_allowed(origin) {
            tracing::warn!(
                origin = ?origin,
                path = %request.uri().path(),
                "Rejecting request from origin outside the allow-list"
            );
            return Err(AppError::Forbidden(anyhow::anyhow!("Origin not allowed")));
        }
    }

    Ok(next.run(request).await)
}
