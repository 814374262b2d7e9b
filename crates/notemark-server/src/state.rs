use std::sync::Arc;

use notemark_grammar::GrammarCheck;
use notemark_render::Views;
use notemark_storage::NoteStore;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NoteStore>,
    pub grammar: Arc<dyn GrammarCheck>,
    pub views: Arc<Views>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn NoteStore>,
        grammar: Arc<dyn GrammarCheck>,
        views: Arc<Views>,
    ) -> Self {
        Self {
            store,
            grammar,
            views,
        }
    }
}
