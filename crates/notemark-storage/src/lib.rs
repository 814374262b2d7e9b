//! notemark-storage
//!
//! Note persistence. Thin wrapper around the MongoDB driver, plus an
//! in-memory store with the same contract.

pub mod document;
pub mod error;
pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use notemark_core::models::{NewNote, Note, NoteId};

use crate::error::StoreError;

pub use memory::MemoryNoteStore;
pub use mongo::{MongoNoteStore, StoreConfig, StoreTimeouts};

/// Create/list/get/delete over persisted notes.
///
/// Identifiers arrive as raw strings so that a malformed id surfaces as
/// [`StoreError::InvalidId`] from the store itself.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Stamp `createdAt` with the current time, insert, and return the new id.
    async fn create(&self, note: NewNote) -> Result<NoteId, StoreError>;

    /// All notes, newest first.
    async fn list_all(&self) -> Result<Vec<Note>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Note, StoreError>;

    /// Fails with [`StoreError::NotFound`] when nothing was removed.
    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError>;
}
