pub mod auth;
pub mod blog;
pub mod chatbot;
pub mod contact;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod gallery;
pub mod middleware;
pub mod products;
pub mod router;
pub mod uploads;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::error;

use sinfini_db::Database;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Root directory that `/uploads/...` media references resolve against.
    pub upload_dir: PathBuf,
}

/// Run a data-access call off the async runtime. The connection lock is held
/// only while `f` runs.
pub(crate) async fn db_call<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal("background task failed".into())
        })?
        .map_err(ApiError::Storage)
}
