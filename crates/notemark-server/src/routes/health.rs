use axum::Json;
use axum::extract::State;
use serde::Serialize;

use notemark_grammar::GrammarState;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    grammar: GrammarState,
}

/// Liveness plus the grammar checker's lifecycle state. Does not touch the
/// database.
pub async fn health_check(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        grammar: state.grammar.state(),
    })
}
