//! API routes

pub mod admin;
pub mod health;
pub mod invitations;
pub mod rsvp;

use axum::routing::{delete, get, post};
use axum::{middleware, Router};

use super::middleware::require_admin;
use super::state::AppState;

/// Routes, still waiting for their state.
pub fn routes(state: &AppState) -> Router<AppState> {
    // Guest form (no auth)
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/rsvp", get(rsvp::lookup).post(rsvp::submit))
        .route("/api/rsvp/{id}/confirmation", get(rsvp::confirmation))
        .route("/api/admin/auth", post(admin::auth))
        // Checks the password carried in its own body.
        .route("/api/admin/setup", post(admin::setup));

    // Dashboard (x-admin-password)
    let dashboard = Router::new()
        .route(
            "/api/invitations",
            get(invitations::list).post(invitations::create),
        )
        .route("/api/invitations/{id}", delete(invitations::remove))
        .route("/api/rsvp/{id}/history", get(rsvp::history))
        .route("/api/admin/responses", get(admin::responses))
        .route("/api/admin/summary", get(admin::summary))
        .route("/api/admin/export", get(admin::export))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    public.merge(dashboard)
}
