//! Note CRUD handlers. Every route requires a bearer token.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use notegraph_core::{Note, NoteInDb};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/notes",
    tag = "Notes",
    request_body = Note,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Note stored", body = NoteInDb),
        (status = 400, description = "Field too long"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_note(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(note): Json<Note>,
) -> Result<impl IntoResponse, ApiError> {
    let stored = state.notes.create(note).await?;
    Ok(Json(stored))
}

#[utoipa::path(
    get,
    path = "/notes",
    tag = "Notes",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Every stored note, by id", body = [NoteInDb]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_notes(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let notes = state.notes.list().await?;
    Ok(Json(notes))
}

#[utoipa::path(
    get,
    path = "/notes/{id}",
    tag = "Notes",
    params(("id" = i64, Path, description = "Note id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The note", body = NoteInDb),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Note not found")
    )
)]
pub async fn get_note(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes.get(id).await?;
    Ok(Json(note))
}

/// Overwrite a note.
///
/// Unless strict updates are enabled, a missing id still answers 200 with the
/// submitted payload and nothing is stored.
#[utoipa::path(
    put,
    path = "/notes/{id}",
    tag = "Notes",
    params(("id" = i64, Path, description = "Note id")),
    request_body = Note,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Submitted note with the requested id", body = NoteInDb),
        (status = 400, description = "Field too long"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Note not found (strict updates only)")
    )
)]
pub async fn update_note(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
    Json(note): Json<Note>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.notes.update(id, note).await?;
    Ok(Json(updated))
}
