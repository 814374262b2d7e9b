pub mod content_flavor;
pub mod grammar_issue;
pub mod note;

pub use content_flavor::ContentFlavor;
pub use grammar_issue::GrammarIssue;
pub use note::{NewNote, Note, NoteId};
