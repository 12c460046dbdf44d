//! HTTP server for the task service.
//!
//! - `/health`, `/register` and `/login` are public
//! - every `/tasks` route needs `Authorization: Bearer <jwt>`

mod handlers;
mod routes;

pub use routes::create_router;

use std::sync::Arc;

use axum::extract::FromRef;
use taskd_core::app::{TaskService, UserService};

use crate::auth::JwtKeys;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: TaskService,
    pub users: UserService,
    pub keys: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(service: TaskService, users: UserService, keys: JwtKeys) -> Self {
        Self {
            service,
            users,
            keys: Arc::new(keys),
        }
    }
}

impl FromRef<AppState> for Arc<JwtKeys> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.keys)
    }
}
