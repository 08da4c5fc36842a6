//! HTTP surface of Jotter: handlers, auth middleware and router assembly.

pub mod auth;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod password;
pub mod posts;
pub mod routes;
pub mod state;
pub mod token;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};
