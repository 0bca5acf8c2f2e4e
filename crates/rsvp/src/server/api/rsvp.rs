//! Guest-facing RSVP endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::error::Error;
use crate::model::{Guest, Invitation, Submission};
use crate::report;
use crate::server::error::ApiError;
use crate::server::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Query string for the name lookup.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    name: Option<String>,
}

/// Body of an RSVP submission.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    invitation_id: String,
    guests: Vec<Guest>,
}

/// `GET /api/rsvp?name=` finds the invitation a guest is searching for.
pub async fn lookup(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<Invitation>> {
    let name = query
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| Error::invalid("Name parameter required"))?;

    let invitation = state
        .with_storage(move |s| s.find_invitation_by_name(&name))
        .await?
        .ok_or_else(|| Error::not_found("Invitation"))?;

    Ok(Json(invitation))
}

/// `POST /api/rsvp` records a new submission for an invitation.
pub async fn submit(
    State(state): State<AppState>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> ApiResult<Json<Submission>> {
    let Json(request) = body?;
    if request.invitation_id.trim().is_empty() {
        return Err(Error::invalid("Invalid request data").into());
    }

    let submission = state
        .with_storage(move |s| s.submit_rsvp(&request.invitation_id, &request.guests))
        .await?;

    info!(
        "RSVP #{} received for invitation {} ({} guests)",
        submission.submission_number,
        submission.invitation_id,
        submission.guests.len()
    );
    Ok(Json(submission))
}

/// `GET /api/rsvp/{id}/history`, oldest submission first. Dashboard only.
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Submission>>> {
    let submissions = state
        .with_storage(move |s| s.submission_history(&id))
        .await?;
    Ok(Json(submissions))
}

/// `GET /api/rsvp/{id}/confirmation` renders the current submission as
/// plain text.
pub async fn confirmation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let (invitation, submission) = state
        .with_storage(move |s| {
            let invitation = s
                .get_invitation(&id)?
                .ok_or_else(|| Error::not_found("Invitation"))?;
            let submission = s
                .current_submission(&id)?
                .ok_or_else(|| Error::not_found("RSVP"))?;
            Ok((invitation, submission))
        })
        .await?;

    let text = report::confirmation_text(state.event_name(), &invitation, &submission);
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}
