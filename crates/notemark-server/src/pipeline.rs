//! Upload processing: validate the uploaded file, grammar-check it, render
//! it, and persist the result.

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use thiserror::Error;
use tracing::{info, warn};

use notemark_core::models::{GrammarIssue, NewNote, NoteId};
use notemark_grammar::GrammarCheck;
use notemark_render::to_display_markup;

use crate::error::ApiError;
use crate::state::AppState;

/// Multipart field carrying the uploaded note.
pub const UPLOAD_FIELD: &str = "noteFile";

/// Upper bound on the whole upload request body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const NOTE_EXTENSION: &str = ".md";

/// Reasons an upload is rejected before anything is stored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Could not parse multipart form: {0}")]
    Multipart(String),

    #[error("File exceeds the 10 MiB upload limit.")]
    TooLarge,

    #[error("Error retrieving the file: no '{UPLOAD_FIELD}' field in upload")]
    MissingFile,

    #[error("Invalid file type. Only .md files are allowed.")]
    WrongExtension,

    #[error("Uploaded file is empty.")]
    EmptyFile,

    #[error("Uploaded file is not valid UTF-8 text.")]
    NotUtf8,
}

/// The raw upload as received.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Bytes,
}

/// An upload that passed validation.
#[derive(Debug, PartialEq, Eq)]
pub struct ValidatedUpload {
    /// Base name only; any client-side directories are dropped.
    pub filename: String,
    pub markdown: String,
}

/// Pull the `noteFile` part out of the form. Other parts are skipped.
pub async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, ValidationError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field
            .bytes()
            .await
            .map_err(multipart_error)?;
        return Ok(UploadedFile { filename, content });
    }
    Err(ValidationError::MissingFile)
}

fn multipart_error(e: MultipartError) -> ValidationError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::TooLarge
    } else {
        ValidationError::Multipart(e.body_text())
    }
}

/// Checked in order: extension, then emptiness, then encoding.
pub fn validate(upload: UploadedFile) -> Result<ValidatedUpload, ValidationError> {
    if !upload.filename.to_lowercase().ends_with(NOTE_EXTENSION) {
        return Err(ValidationError::WrongExtension);
    }
    if upload.content.is_empty() {
        return Err(ValidationError::EmptyFile);
    }
    let markdown =
        String::from_utf8(upload.content.to_vec()).map_err(|_| ValidationError::NotUtf8)?;

    Ok(ValidatedUpload {
        filename: sanitize_filename(&upload.filename),
        markdown,
    })
}

/// Strip any directory components, whichever separator the client used.
pub fn sanitize_filename(name: &str) -> String {
    name.rsplit(['/', '\\']).next().unwrap_or(name).to_string()
}

/// Grammar issues for `text`, or a single issue describing why the check
/// could not run. Never fails the upload.
pub async fn check_or_explain(
    grammar: &dyn GrammarCheck,
    text: &str,
    filename: &str,
) -> Vec<GrammarIssue> {
    match grammar.check_text(text, None).await {
        Ok(issues) => {
            info!(filename, issues = issues.len(), "grammar check complete");
            issues
        }
        Err(e) => {
            warn!(filename, error = %e, "grammar check failed, storing note without it");
            vec![GrammarIssue::synthetic(format!("Grammar check process failed: {e}"))]
        }
    }
}

/// Grammar-check, render, and persist a validated upload.
pub async fn process_upload(state: &AppState, upload: ValidatedUpload) -> Result<NoteId, ApiError> {
    let grammar_issues =
        check_or_explain(state.grammar.as_ref(), &upload.markdown, &upload.filename).await;
    let html_content = to_display_markup(&upload.markdown);

    let note = NewNote {
        original_filename: upload.filename,
        markdown_content: upload.markdown,
        html_content,
        grammar_issues,
    };
    let filename = note.original_filename.clone();

    let id = state
        .store
        .create(note)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to save note {filename}: {e}")))?;

    info!(%id, filename = %filename, "note saved");
    Ok(id)
}
