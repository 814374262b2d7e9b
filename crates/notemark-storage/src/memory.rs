use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use notemark_core::models::{NewNote, Note, NoteId};

use crate::NoteStore;
use crate::error::StoreError;

/// A [`NoteStore`] held in process memory.
///
/// Follows the same contract as the MongoDB store: ids are object-id hex
/// strings, listing is newest first, and deleting an absent note is
/// [`StoreError::NotFound`].
#[derive(Default)]
pub struct MemoryNoteStore {
    notes: RwLock<Vec<Note>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notes.read().await.is_empty()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn create(&self, note: NewNote) -> Result<NoteId, StoreError> {
        let id = NoteId::parse(&ObjectId::new().to_hex())?;
        let stored = Note::from_new(id.clone(), note, jiff::Timestamp::now());
        self.notes.write().await.push(stored);
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<Note>, StoreError> {
        // Reverse insertion order first so that equal timestamps still list
        // the most recent insert first after the stable sort.
        let mut notes: Vec<Note> = self.notes.read().await.iter().rev().cloned().collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn get_by_id(&self, id: &str) -> Result<Note, StoreError> {
        let id = NoteId::parse(id)?;
        self.notes
            .read()
            .await
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let id = NoteId::parse(id)?;
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use notemark_core::models::GrammarIssue;

    use super::*;

    fn note(name: &str) -> NewNote {
        NewNote {
            original_filename: name.to_string(),
            markdown_content: format!("# {name}"),
            html_content: format!("<h1>{name}</h1>\n"),
            grammar_issues: vec![GrammarIssue::synthetic("none")],
        }
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = MemoryNoteStore::new();
        store.create(note("first.md")).await.unwrap();
        store.create(note("second.md")).await.unwrap();
        store.create(note("third.md")).await.unwrap();

        let names: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.original_filename)
            .collect();
        assert_eq!(names, ["third.md", "second.md", "first.md"]);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = MemoryNoteStore::new();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_then_delete_then_not_found() {
        let store = MemoryNoteStore::new();
        let id = store.create(note("a.md")).await.unwrap();

        let fetched = store.get_by_id(id.as_str()).await.unwrap();
        assert_eq!(fetched.original_filename, "a.md");
        assert_eq!(fetched.markdown_content, "# a.md");

        store.delete_by_id(id.as_str()).await.unwrap();
        assert!(matches!(
            store.get_by_id(id.as_str()).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete_by_id(id.as_str()).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected() {
        let store = MemoryNoteStore::new();
        assert!(matches!(store.get_by_id("123").await, Err(StoreError::InvalidId(_))));
        assert!(matches!(store.delete_by_id("xyz").await, Err(StoreError::InvalidId(_))));
    }
}
