use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::grammar_issue::GrammarIssue;
use crate::error::CoreError;

/// Length of a store-assigned identifier in its hex form.
const ID_HEX_LEN: usize = 24;

/// A store-assigned note identifier, held as 24 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteId(String);

impl NoteId {
    /// Validate an identifier string. Hex digits are normalized to lowercase.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.len() != ID_HEX_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidId(raw.to_string()));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for NoteId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NoteId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NoteId> for String {
    fn from(id: NoteId) -> Self {
        id.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A note as assembled by the upload pipeline, before the store has
/// assigned it an identity and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNote {
    pub original_filename: String,
    pub markdown_content: String,
    /// Display markup derived from `markdown_content` at creation time.
    pub html_content: String,
    pub grammar_issues: Vec<GrammarIssue>,
}

/// A persisted note. Immutable once created; removed only by deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub original_filename: String,
    pub markdown_content: String,
    pub html_content: String,
    pub grammar_issues: Vec<GrammarIssue>,
    pub created_at: jiff::Timestamp,
}

impl Note {
    /// Attach the store-assigned identity to a pipeline-built note.
    pub fn from_new(id: NoteId, new: NewNote, created_at: jiff::Timestamp) -> Self {
        Self {
            id,
            original_filename: new.original_filename,
            markdown_content: new.markdown_content,
            html_content: new.html_content,
            grammar_issues: new.grammar_issues,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_id() {
        let id = NoteId::parse("65F1C2A3B4D5E6F708192A3B").unwrap();
        assert_eq!(id.as_str(), "65f1c2a3b4d5e6f708192a3b");
        assert_eq!(id.to_string(), "65f1c2a3b4d5e6f708192a3b");
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in ["", "abc", "65f1c2a3b4d5e6f708192a3", "zzf1c2a3b4d5e6f708192a3b", "65f1c2a3b4d5e6f708192a3b0"] {
            assert_eq!(NoteId::parse(raw), Err(CoreError::InvalidId(raw.to_string())));
        }
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = NoteId::parse("65f1c2a3b4d5e6f708192a3b").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"65f1c2a3b4d5e6f708192a3b\"");

        let bad: Result<NoteId, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn from_new_keeps_content_fields() {
        let new = NewNote {
            original_filename: "todo.md".to_string(),
            markdown_content: "# Todo".to_string(),
            html_content: "<h1 id=\"todo\">Todo</h1>\n".to_string(),
            grammar_issues: vec![GrammarIssue::synthetic("checker offline")],
        };
        let id = NoteId::parse("65f1c2a3b4d5e6f708192a3b").unwrap();
        let note = Note::from_new(id.clone(), new.clone(), jiff::Timestamp::UNIX_EPOCH);

        assert_eq!(note.id, id);
        assert_eq!(note.original_filename, new.original_filename);
        assert_eq!(note.markdown_content, new.markdown_content);
        assert_eq!(note.html_content, new.html_content);
        assert_eq!(note.grammar_issues, new.grammar_issues);
    }
}
