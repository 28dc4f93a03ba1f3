//! Icon protocol routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use markers::error::ErrorCode;
use markers::wire::{LoadRequest, LoadResponse, SaveBatch, SaveResponse};

use crate::routes::auth::AuthUser;
use crate::services::icon::{self, IconError};
use crate::state::AppState;

/// Structured error body: grepable code plus a human-readable message.
type ApiError = (StatusCode, Json<serde_json::Value>);

/// `POST /mapmemo/loadicon/` — icons of the caller inside a rectangle.
pub async fn load_icon(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<LoadRequest>,
) -> Result<Json<LoadResponse>, ApiError> {
    let response = icon::load_icons(&state.pool, auth.user.id, request.load_extent)
        .await
        .map_err(icon_error_to_response)?;

    Ok(Json(response))
}

/// `POST /mapmemo/saveicon/` — apply the widget's pending diff atomically.
pub async fn save_icon(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(batch): Json<SaveBatch>,
) -> Result<Json<SaveResponse>, ApiError> {
    let response = icon::save_icons(&state.pool, auth.user.id, batch)
        .await
        .map_err(icon_error_to_response)?;

    Ok(Json(response))
}

fn icon_error_to_response(err: IconError) -> ApiError {
    tracing::error!(code = err.error_code(), error = %err, "icon request failed");
    let status = match err {
        IconError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        IconError::UnknownImage(_) | IconError::MissingTempId => StatusCode::BAD_REQUEST,
    };
    let body = serde_json::json!({
        "code": err.error_code(),
        "message": err.to_string(),
    });
    (status, Json(body))
}
