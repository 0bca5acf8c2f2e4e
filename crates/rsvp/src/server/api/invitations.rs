//! Invitation management for the dashboard.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Error;
use crate::model::{Invitation, NewInvitation};
use crate::server::error::ApiError;
use crate::server::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Optional dashboard filter.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    q: Option<String>,
}

/// `GET /api/invitations[?q=]`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Invitation>>> {
    let term = query.q.unwrap_or_default();
    let invitations = state
        .with_storage(move |s| s.search_invitations(&term))
        .await?;
    Ok(Json(invitations))
}

/// `POST /api/invitations`
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewInvitation>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Invitation>)> {
    let Json(input) = body?;
    let invitation = state
        .with_storage(move |s| s.create_invitation(&input))
        .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

/// `DELETE /api/invitations/{id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let target = id.clone();
    let deleted = state
        .with_storage(move |s| s.delete_invitation(&target))
        .await?;

    if !deleted {
        return Err(Error::not_found("Invitation").into());
    }
    Ok(Json(json!({ "success": true, "id": id })))
}
