use std::sync::Arc;

use jotter_db::Database;
use tracing::error;

use crate::error::ApiError;
use crate::password::Passwords;
use crate::token::TokenKeys;

pub type AppState = Arc<AppStateInner>;

/// Everything a handler needs, built once at startup and shared by `Arc`.
pub struct AppStateInner {
    pub db: Database,
    pub passwords: Passwords,
    pub tokens: TokenKeys,
}

impl AppStateInner {
    pub fn new(db: Database, passwords: Passwords, tokens: TokenKeys) -> AppState {
        Arc::new(Self {
            db,
            passwords,
            tokens,
        })
    }
}

/// Run database work and password hashing off the async runtime.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(state.as_ref()))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal("blocking task failed".into())
        })?
}
