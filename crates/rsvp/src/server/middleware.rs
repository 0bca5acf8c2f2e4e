//! Request middleware: access logging and the admin gate.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::state::AppState;

/// Header carrying the organizer password on admin requests.
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Log every request with its status and latency.
///
/// Uses `x-request-id` when the client sends one.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);

    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| req.uri().path().to_string(), |p| p.as_str().to_string());

    debug!(request_id = %request_id, method = %method, path = %path, "Request started");

    let response = next.run(req).await;

    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Request failed"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Request completed"
        );
    }

    response
}

/// Reject admin requests without the right `x-admin-password` header.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let candidate = req
        .headers()
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if let Err(err) = state.check_password(candidate) {
        warn!(path = %req.uri().path(), "Admin request rejected: {}", err);
        return ApiError(err).into_response();
    }

    next.run(req).await
}
