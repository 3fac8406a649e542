use crate::middleware::correlation::CorrelationId;
use crate::routes::error::invalid_input;
use crate::{AppState, build_tracker};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use tk_core::tracker::DEFAULT_COMMIT_AUTHOR;
use tk_core::types::WebhookCommitInput;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/integrations/webhook/vcs", post(vcs_webhook))
        .with_state(state)
}

/// Acknowledges as soon as processing is dispatched; issue updates land
/// afterwards.
#[utoipa::path(
    post,
    path = "/api/integrations/webhook/vcs",
    request_body = WebhookCommitInput,
    responses(
        (status = 200, body = WebhookAck),
        (status = 400, body = crate::routes::error::ErrorEnvelope)
    )
)]
pub(crate) async fn vcs_webhook(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    payload: Result<Json<WebhookCommitInput>, JsonRejection>,
) -> Response {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            return invalid_input(rejection.body_text(), Some(correlation.0)).into_response();
        }
    };
    let Some(message) = input.message.filter(|message| !message.trim().is_empty()) else {
        return invalid_input("message is required", Some(correlation.0)).into_response();
    };
    let author = input
        .author
        .filter(|author| !author.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COMMIT_AUTHOR.to_string());
    tracing::info!(author = %author, correlation_id = %correlation.0, "vcs webhook received");

    let correlation_id = correlation.0;
    tokio::task::spawn_blocking(move || match build_tracker(&state) {
        Ok(tracker) => {
            let outcome = tracker.webhooks().process_commit(&message, &author);
            tracing::info!(
                correlation_id = %correlation_id,
                transitioned = outcome.transitioned.len(),
                skipped = outcome.skipped.len(),
                failed = outcome.failed.len(),
                "vcs webhook processed"
            );
        }
        Err(err) => {
            tracing::error!(correlation_id = %correlation_id, error = %err, "vcs webhook dropped");
        }
    });

    Json(WebhookAck {
        success: true,
        message: "Processed".to_string(),
    })
    .into_response()
}
