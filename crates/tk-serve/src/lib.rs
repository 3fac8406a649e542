pub mod middleware;
pub mod openapi;
pub mod routes;

use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tk_core::{Tracker, TrackerError, VcsService};
use tk_db::DbStore;
use tk_db::schema;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub db_path: PathBuf,
    pub vcs: Arc<VcsService>,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>, vcs: Arc<VcsService>) -> Self {
        Self {
            db_path: db_path.into(),
            vcs,
        }
    }
}

pub fn build_tracker(state: &AppState) -> Result<Tracker<DbStore>, TrackerError> {
    let conn = schema::open_and_migrate(&state.db_path).map_err(|err| TrackerError::Internal {
        message: err.to_string(),
    })?;
    Ok(Tracker::new(DbStore::new(conn)))
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app(state)).await
}
