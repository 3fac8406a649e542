use crate::middleware::correlation::CorrelationId;
use crate::routes::error::{invalid_input, map_error};
use crate::{AppState, build_tracker};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use tk_core::TrackerError;
use tk_core::types::{AuditEntry, CommitRecord, DiffResponse, IssueId};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct DiffQuery {
    repo: String,
    revision: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/issues/{id}/commits", get(list_commits))
        .route("/issues/{id}/commits/diff", get(get_diff))
        .route("/issues/{id}/audit", get(list_audit))
        .with_state(state)
}

fn parse_issue_id(id: &str, correlation: &CorrelationId) -> Result<IssueId, Response> {
    IssueId::parse(id).map_err(|err| {
        invalid_input(err.to_string(), Some(correlation.0.clone())).into_response()
    })
}

#[utoipa::path(
    get,
    path = "/api/issues/{id}/commits",
    params(("id" = i64, Path, description = "Issue ID")),
    responses((status = 200, body = Vec<CommitRecord>))
)]
pub(crate) async fn list_commits(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
) -> Response {
    let issue_id = match parse_issue_id(&id, &correlation) {
        Ok(value) => value,
        Err(response) => return response,
    };
    Json(state.vcs.commits(issue_id).await).into_response()
}

#[utoipa::path(
    get,
    path = "/api/issues/{id}/commits/diff",
    params(("id" = i64, Path, description = "Issue ID"), DiffQuery),
    responses(
        (status = 200, body = DiffResponse),
        (status = 400, body = crate::routes::error::ErrorEnvelope),
        (status = 404, body = crate::routes::error::ErrorEnvelope)
    )
)]
pub(crate) async fn get_diff(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Query(query): Query<DiffQuery>,
) -> Response {
    if let Err(response) = parse_issue_id(&id, &correlation) {
        return response;
    }
    match state.vcs.diff(&query.repo, &query.revision).await {
        Ok(diff) => Json(DiffResponse { diff }).into_response(),
        Err(err) => map_error(&TrackerError::from(err), Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/issues/{id}/audit",
    params(("id" = i64, Path, description = "Issue ID")),
    responses((status = 200, body = Vec<AuditEntry>))
)]
pub(crate) async fn list_audit(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
) -> Response {
    let issue_id = match parse_issue_id(&id, &correlation) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let result = tokio::task::spawn_blocking(move || {
        let tracker = build_tracker(&state)?;
        tracker.audit().list_for_issue(&issue_id)
    })
    .await
    .unwrap_or_else(|err| {
        Err(TrackerError::Internal {
            message: err.to_string(),
        })
    });
    match result {
        Ok(entries) => Json(entries).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}
