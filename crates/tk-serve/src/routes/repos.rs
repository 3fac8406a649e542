use crate::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tk_core::types::RepositorySummary;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/repos", get(list_repos))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/repos",
    responses((status = 200, body = Vec<RepositorySummary>))
)]
pub(crate) async fn list_repos(State(state): State<AppState>) -> Json<Vec<RepositorySummary>> {
    Json(state.vcs.registry().summaries())
}
