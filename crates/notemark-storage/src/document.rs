use mongodb::bson::DateTime;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use notemark_core::models::{GrammarIssue, NewNote, Note, NoteId};

use crate::error::StoreError;

/// Current shape of a persisted note. Documents written before the field
/// existed deserialize as version 1.
pub const SCHEMA_VERSION: i32 = 1;

fn default_schema_version() -> i32 {
    1
}

/// A note as stored in the `notes` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default = "default_schema_version")]
    pub schema_version: i32,
    pub original_filename: String,
    pub markdown_content: String,
    pub html_content: String,
    #[serde(default)]
    pub grammar_issues: Option<Vec<IssueDocument>>,
    pub created_at: DateTime,
}

/// A grammar issue embedded in a [`NoteDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueDocument {
    pub message: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub length: i64,
    // Older writers stored an empty list as null.
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

impl NoteDocument {
    /// Build the insertable document for a new note, stamped with `created_at`.
    pub fn from_new(note: &NewNote, created_at: jiff::Timestamp) -> Self {
        Self {
            id: None,
            schema_version: SCHEMA_VERSION,
            original_filename: note.original_filename.clone(),
            markdown_content: note.markdown_content.clone(),
            html_content: note.html_content.clone(),
            grammar_issues: Some(note.grammar_issues.iter().map(IssueDocument::from).collect()),
            created_at: DateTime::from_millis(created_at.as_millisecond()),
        }
    }
}

impl From<&GrammarIssue> for IssueDocument {
    fn from(issue: &GrammarIssue) -> Self {
        Self {
            message: issue.message.clone(),
            context: issue.context.clone(),
            offset: i64::try_from(issue.offset).unwrap_or(i64::MAX),
            length: i64::try_from(issue.length).unwrap_or(i64::MAX),
            suggestions: Some(issue.suggestions.clone()),
        }
    }
}

impl TryFrom<NoteDocument> for Note {
    type Error = StoreError;

    fn try_from(doc: NoteDocument) -> Result<Self, Self::Error> {
        let oid = doc.id.ok_or_else(|| StoreError::Corrupt {
            id: "<none>".to_string(),
            reason: "missing _id".to_string(),
        })?;
        let hex = oid.to_hex();
        let corrupt = |reason: String| StoreError::Corrupt {
            id: hex.clone(),
            reason,
        };

        let created_at = jiff::Timestamp::from_millisecond(doc.created_at.timestamp_millis())
            .map_err(|e| corrupt(format!("createdAt out of range: {e}")))?;

        let grammar_issues = doc
            .grammar_issues
            .unwrap_or_default()
            .into_iter()
            .map(|issue| {
                let offset = usize::try_from(issue.offset)
                    .map_err(|_| corrupt(format!("negative issue offset {}", issue.offset)))?;
                let length = usize::try_from(issue.length)
                    .map_err(|_| corrupt(format!("negative issue length {}", issue.length)))?;
                Ok(GrammarIssue {
                    message: issue.message,
                    context: issue.context,
                    offset,
                    length,
                    suggestions: issue.suggestions.unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(Note {
            id: NoteId::parse(&hex)?,
            original_filename: doc.original_filename,
            markdown_content: doc.markdown_content,
            html_content: doc.html_content,
            grammar_issues,
            created_at,
        })
    }
}
