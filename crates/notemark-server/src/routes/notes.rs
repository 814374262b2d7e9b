use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tracing::{info, warn};

use notemark_core::models::ContentFlavor;
use notemark_storage::error::StoreError;

use crate::error::ApiError;
use crate::pipeline;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NoteQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Accept an uploaded `.md` file and answer with the refreshed note list.
pub async fn upload_note(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, ApiError> {
    let upload = pipeline::read_upload(multipart).await?;
    let upload = pipeline::validate(upload)?;
    pipeline::process_upload(&state, upload).await?;
    note_list_fragment(&state).await
}

/// One note as raw Markdown, stored HTML, or the detail view (the default).
pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<NoteQuery>,
) -> Result<Response, ApiError> {
    let note = state.store.get_by_id(&id).await?;

    let response = match ContentFlavor::from_query(query.kind.as_deref()) {
        ContentFlavor::Markdown => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            note.markdown_content,
        )
            .into_response(),
        ContentFlavor::Html => Html(note.html_content).into_response(),
        ContentFlavor::Details => Html(state.views.note_detail(&note)?).into_response(),
    };
    Ok(response)
}

/// Delete a note and answer with the refreshed list. Deleting a note that is
/// already gone still succeeds.
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    match state.store.delete_by_id(&id).await {
        Ok(()) => info!(id = %id, "note deleted"),
        Err(StoreError::NotFound { .. }) => info!(id = %id, "delete requested for missing note"),
        Err(e) => return Err(e.into()),
    }
    note_list_fragment(&state).await
}

/// The list fragment after a mutation. The mutation already succeeded, so a
/// failed re-fetch renders an empty list rather than an error.
async fn note_list_fragment(state: &AppState) -> Result<Html<String>, ApiError> {
    let notes = match state.store.list_all().await {
        Ok(notes) => notes,
        Err(e) => {
            warn!(error = %e, "failed to reload notes after update");
            Vec::new()
        }
    };
    Ok(Html(state.views.note_list(&notes)?))
}
