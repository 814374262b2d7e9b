use axum::extract::State;
use axum::response::Html;

use crate::error::ApiError;
use crate::state::AppState;

pub const PAGE_TITLE: &str = "Markdown Notes";

/// The full page with every stored note, newest first.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let notes = state
        .store
        .list_all()
        .await
        .map_err(|e| ApiError::Internal(format!("failed to load notes: {e}")))?;

    Ok(Html(state.views.page(PAGE_TITLE, &notes)?))
}
