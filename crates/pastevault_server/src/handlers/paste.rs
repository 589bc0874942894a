//! Paste HTTP handlers.

use crate::{error::HttpError, models::paste::*, AppError, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

const CREATE_FAILURE: &str = "Failed to create paste";
const RETRIEVE_FAILURE: &str = "Failed to retrieve paste";

fn reject_body(rejection: JsonRejection) -> HttpError {
    AppError::Validation(format!("Invalid request body: {}", rejection.body_text())).into()
}

/// Create a new paste.
///
/// # Arguments
/// - `state`: Application state.
/// - `payload`: JSON body with paste content and an optional language label.
///
/// # Returns
/// The public id of the new paste as `{"pasteId": ...}`.
///
/// # Errors
/// Returns 400 for bodies that are not a JSON paste request, empty or oversized
/// content and over-long labels, 500 otherwise.
pub async fn create_paste(
    State(state): State<AppState>,
    payload: Result<Json<CreatePasteRequest>, JsonRejection>,
) -> Result<Json<CreatePasteResponse>, HttpError> {
    let Json(req) = payload.map_err(reject_body)?;
    let paste_id = state
        .store
        .create(req.content.as_bytes(), req.language.as_deref())
        .await
        .map_err(|err| HttpError::new(err, CREATE_FAILURE))?;
    Ok(Json(CreatePasteResponse { paste_id }))
}

/// Fetch a paste by public id, counting the view.
///
/// # Returns
/// `{content, language, views, createdAt}` with `views` including this request.
///
/// # Errors
/// Returns 404 when the id is unknown or expired, 500 on corrupt rows or
/// storage failures.
pub async fn get_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PasteResponse>, HttpError> {
    let fetched = state
        .store
        .fetch(&id)
        .await
        .map_err(|err| HttpError::new(err, RETRIEVE_FAILURE))?;
    PasteResponse::from_fetched(&id, fetched)
        .map(Json)
        .map_err(|err| {
            tracing::error!(paste_id = %id, kind = err.kind(), "Stored paste is not valid UTF-8");
            HttpError::new(err, RETRIEVE_FAILURE)
        })
}
