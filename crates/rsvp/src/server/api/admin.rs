//! Organizer dashboard endpoints.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::Error;
use crate::report::{self, ExportFormat, ResponseGroup, Summary};
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::setup::{self, SetupAction, SetupReport};

type ApiResult<T> = Result<T, ApiError>;

/// Body of `POST /api/admin/auth`.
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    password: String,
}

/// Body of `POST /api/admin/setup`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequest {
    #[serde(default)]
    action: String,
    #[serde(default)]
    admin_password: String,
}

/// Export query; defaults to CSV.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    format: Option<String>,
}

/// `POST /api/admin/auth` lets the dashboard check a password before use.
pub async fn auth(
    State(state): State<AppState>,
    body: Result<Json<AuthRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body?;
    state.check_password(&request.password)?;
    Ok(Json(json!({ "success": true })))
}

/// `POST /api/admin/setup`
pub async fn setup(
    State(state): State<AppState>,
    body: Result<Json<SetupRequest>, JsonRejection>,
) -> ApiResult<Json<SetupReport>> {
    let Json(request) = body?;

    state
        .check_password(&request.admin_password)
        .map_err(|err| match err {
            Error::InvalidPassword => Error::InvalidAdminPassword,
            other => other,
        })?;
    let action: SetupAction = request.action.parse()?;

    let report = state.with_storage(move |s| setup::run(s, action)).await?;
    Ok(Json(report))
}

/// `GET /api/admin/responses`: current responses grouped by invitation.
pub async fn responses(State(state): State<AppState>) -> ApiResult<Json<Vec<ResponseGroup>>> {
    let groups = state.with_storage(|s| s.current_responses()).await?;
    Ok(Json(groups))
}

/// `GET /api/admin/summary`
pub async fn summary(State(state): State<AppState>) -> ApiResult<Json<Summary>> {
    let groups = state.with_storage(|s| s.current_responses()).await?;
    Ok(Json(report::summarize(&groups)))
}

/// `GET /api/admin/export?format=csv|json|summary` as a dated download.
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let format = match query.format.as_deref() {
        Some(raw) => raw.parse::<ExportFormat>()?,
        None => ExportFormat::default(),
    };

    let groups = state.with_storage(|s| s.current_responses()).await?;
    let body = format.render(&groups)?;
    let filename = format.filename(state.event_name(), Utc::now().date_naive());

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| Error::internal(format!("invalid export filename: {e}")))?;

    info!("Exported {} responses as {}", groups.len(), format);
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(format.content_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
