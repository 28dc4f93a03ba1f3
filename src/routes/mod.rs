//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Two JSON endpoints carry the whole icon protocol: one viewport load,
//! one batch save. Everything mutating sits behind the CSRF double-submit
//! check; authentication is a session cookie resolved per request.

pub mod auth;
pub mod icons;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::csrf;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/mapmemo/csrf/", get(csrf::issue))
        .route("/mapmemo/loadicon/", post(icons::load_icon))
        .route("/mapmemo/saveicon/", post(icons::save_icon))
        .layer(middleware::from_fn(csrf::require_csrf))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
