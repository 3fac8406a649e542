use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;
use tk_core::error::{
    AuditError, ConfigError, IssueError, NotificationError, TrackerError, VcsError,
};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &TrackerError,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        TrackerError::Issue(issue) => map_issue_error(issue),
        TrackerError::Audit(audit) => map_audit_error(audit),
        TrackerError::Notification(notification) => map_notification_error(notification),
        TrackerError::Config(config) => map_config_error(config),
        TrackerError::Vcs(vcs) => map_vcs_error(vcs),
        TrackerError::Internal { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            message.clone(),
        ),
    };
    if status.is_server_error() {
        tracing::error!(code, error = %message, "request failed");
    }

    (
        status,
        Json(ErrorEnvelope {
            code,
            message,
            correlation_id,
        }),
    )
}

pub fn invalid_input(
    message: impl Into<String>,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorEnvelope {
            code: "invalid_input",
            message: message.into(),
            correlation_id,
        }),
    )
}

fn map_issue_error(err: &IssueError) -> (StatusCode, &'static str, String) {
    match err {
        IssueError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        IssueError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_audit_error(err: &AuditError) -> (StatusCode, &'static str, String) {
    match err {
        AuditError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_notification_error(err: &NotificationError) -> (StatusCode, &'static str, String) {
    match err {
        NotificationError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_config_error(err: &ConfigError) -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        err.to_string(),
    )
}

fn map_vcs_error(err: &VcsError) -> (StatusCode, &'static str, String) {
    match err {
        VcsError::RepoNotFound { .. } => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        VcsError::InvalidRevision { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        VcsError::CommandFailed { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            err.to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let not_found = TrackerError::Vcs(VcsError::RepoNotFound {
            name: "Unknown Repo".to_string(),
        });
        let (status, Json(body)) = map_error(&not_found, Some("corr_1".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "not_found");
        assert_eq!(body.message, "repository not found: Unknown Repo");
        assert_eq!(body.correlation_id.as_deref(), Some("corr_1"));

        let invalid = TrackerError::Vcs(VcsError::InvalidRevision {
            revision: "-x".to_string(),
        });
        assert_eq!(map_error(&invalid, None).0, StatusCode::BAD_REQUEST);

        let internal = TrackerError::Internal {
            message: "disk".to_string(),
        };
        assert_eq!(
            map_error(&internal, None).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
