use utoipa::OpenApi;

use crate::routes::error::ErrorEnvelope;
use crate::routes::issues::DiffQuery;
use crate::routes::webhooks::WebhookAck;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tk_core::types::{
    AuditAction, AuditEntry, CommitRecord, DiffResponse, IssueId, IssueStatus, RepoKind,
    RepositorySummary, UserId, WebhookCommitInput,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::issues::list_commits,
        crate::routes::issues::get_diff,
        crate::routes::issues::list_audit,
        crate::routes::repos::list_repos,
        crate::routes::webhooks::vcs_webhook,
    ),
    components(schemas(
        CommitRecord,
        DiffResponse,
        DiffQuery,
        AuditEntry,
        AuditAction,
        RepositorySummary,
        RepoKind,
        IssueStatus,
        IssueId,
        UserId,
        WebhookCommitInput,
        WebhookAck,
        ErrorEnvelope,
    ))
)]
pub struct ApiDoc;

pub fn router() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .unwrap_or_else(|err| format!("{{\"error\":\"{err}\"}}"))
}
